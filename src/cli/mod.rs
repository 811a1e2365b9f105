//! CLI command definitions for ticklist.
//!
//! This module defines the CLI structure using clap's derive macros. Item
//! positions on the command line are 1-based to match the displayed
//! numbering; handlers convert to the aggregate's 0-based positions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Checklist manager with model-assisted capture.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List checklists, newest update first
    List {
        /// Only show checklists in this category
        #[arg(long)]
        category: Option<String>,

        /// Match against titles and item names
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one checklist with its items
    Show { checklist: String },

    /// Print a checklist as plain share text
    Share { checklist: String },

    /// Create an empty checklist
    Create {
        title: String,

        #[arg(long, default_value = "other")]
        category: String,
    },

    /// Add an item to a checklist
    Add {
        checklist: String,
        name: String,

        #[arg(long)]
        note: Option<String>,

        #[arg(long, default_value = "medium")]
        priority: String,
    },

    /// Toggle an item's completion
    Toggle {
        checklist: String,
        /// Item position as displayed (1-based)
        position: usize,
    },

    /// Edit an item's name, note, or priority
    Edit {
        checklist: String,
        /// Item position as displayed (1-based)
        position: usize,

        #[arg(long)]
        name: Option<String>,

        /// New note; pass an empty string to clear it
        #[arg(long)]
        note: Option<String>,

        #[arg(long)]
        priority: Option<String>,
    },

    /// Remove an item from a checklist
    Remove {
        checklist: String,
        /// Item position as displayed (1-based)
        position: usize,
    },

    /// Move an item to a new position
    Move {
        checklist: String,
        /// Current position as displayed (1-based)
        from: usize,
        /// Target position as displayed (1-based)
        to: usize,
    },

    /// Rename a checklist
    Rename { checklist: String, title: String },

    /// Change a checklist's category
    Recategorize { checklist: String, category: String },

    /// Delete a checklist and all of its items
    Delete { checklist: String },

    /// Build a checklist from free-form text via the extraction service
    Capture {
        /// Inline input text; omit to read from --file or stdin
        text: Option<String>,

        /// Read input text from a file (a photo OCR dump or a voice transcript)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Originating modality: text, photo, or voice
        #[arg(long, default_value = "text")]
        source: String,
    },

    /// Generate a checklist from a condition via the generation service
    Generate { condition: String },

    /// Start the widget snapshot server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}
