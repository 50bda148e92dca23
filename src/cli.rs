use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::language::TargetLanguage;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Without a command, an interactive menu asks for everything
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a single .rpy file
    File {
        /// Input script file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language (menu number, name or code)
        #[arg(short, long)]
        lang: Option<TargetLanguage>,

        /// Replace `translate english` with `translate <lang>`
        #[arg(long)]
        replace_translate: bool,

        /// Output file (default: translated_<lang>_<timestamp>.rpy)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate every .rpy file in a directory
    Batch {
        /// Directory containing the scripts
        #[arg(short = 'd', long, default_value = ".")]
        input_dir: PathBuf,

        /// Target language (menu number, name or code)
        #[arg(short, long)]
        lang: Option<TargetLanguage>,

        /// Replace `translate english` with `translate <lang>`
        #[arg(long)]
        replace_translate: bool,

        /// Root for the per-language output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List the supported target languages
    Languages,
}
