// Copyright 2026 Saucesort Authors
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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use log::LevelFilter;

use crate::client::OutputMode;

#[derive(Parser, Debug)]
#[command(
    name = "saucesort",
    version,
    about = "Identify image sources by reverse image search and sort them into folders"
)]
pub struct Cli {
    /// Log verbosity (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default global config file
    Init,

    /// Search every image of a directory
    Run(RunArgs),

    /// Normalize a saved response body
    Parse(ParseArgs),

    /// List known database indices
    Databases {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory to scan
    pub dir: PathBuf,

    /// Database index to search (999 = all)
    #[arg(long)]
    pub databases: Option<u32>,

    /// Minimum similarity percentage
    #[arg(long)]
    pub min_similarity: Option<f64>,

    /// Request both response shapes and merge them
    #[arg(long)]
    pub combine: bool,

    /// API key of the search account
    #[arg(long, env = "SAUCENAO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// The API key belongs to a premium account
    #[arg(long)]
    pub premium: bool,

    /// Comma separated categories to leave untouched
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Move images into category folders
    #[arg(long = "move")]
    pub move_to_categories: bool,

    /// Group by author instead of material
    #[arg(long)]
    pub use_author: bool,

    /// Response shape to request
    #[arg(long, value_enum, default_value_t = OutputMode::Markup)]
    pub output_type: OutputMode,

    /// File name to resume from
    #[arg(long)]
    pub start_file: Option<String>,

    /// Minimum similar-title percentage to rename a category
    #[arg(long)]
    pub title_min_similarity: Option<f64>,

    /// Only files created at or after d.m.Y[ H:M[:S]]
    #[arg(long)]
    pub created_after: Option<String>,

    /// Only files modified at or after d.m.Y[ H:M[:S]]
    #[arg(long)]
    pub modified_after: Option<String>,

    /// Glob on file names
    #[arg(long)]
    pub glob: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Saved response body
    pub path: PathBuf,

    /// Shape of the saved body
    #[arg(long, value_enum, default_value_t = OutputMode::Markup)]
    pub mode: OutputMode,

    /// Drop records below this similarity percentage
    #[arg(long)]
    pub min_similarity: Option<f64>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}
