// Copyright 2025 Laurent Pireyn
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::Result;

/// Move files and directories to the trash.
#[derive(Clone, Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Paths to move to the trash.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<Utf8PathBuf>,
}

impl Cli {
    pub fn run() -> Result<()> {
        let cli = Self::parse();
        let mut had_error = false;
        for path in &cli.paths {
            if let Err(err) = xdgtrash::trash(path) {
                eprintln!("trash: {path}: {err}");
                had_error = true;
            }
        }
        if had_error {
            eyre::bail!("one or more paths could not be trashed");
        }
        Ok(())
    }
}
