//! ticklist — checklist manager CLI.
//!
//! Commands load a checklist aggregate from the store, mutate it through the
//! aggregate's own operations, and write it back in one transaction.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use ticklist::checklist::{Checklist, ChecklistItem};
use ticklist::cli::{Cli, Command};
use ticklist::config::Config;
use ticklist::db::Database;
use ticklist::db::checklists::ChecklistQuery;
use ticklist::events::ChangeBus;
use ticklist::format;
use ticklist::services::{ExtractionService, GenerationService, OllamaService};
use ticklist::types::{Category, InputSource, Priority};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "ticklist=debug"
    } else {
        "ticklist=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }
    config.ensure_db_dir()?;

    debug!(db_path = %config.server.db_path.display(), "opening store");
    let db = Database::open(&config.server.db_path)?;

    match cli.command {
        Command::List { category, search } => {
            let query = ChecklistQuery {
                category: category.as_deref().map(parse_category).transpose()?,
                search,
            };
            let checklists = db.list_checklists(&query)?;
            print!("{}", format::format_checklists_markdown(&checklists));
        }

        Command::Show { checklist } => {
            let checklist = db.resolve_checklist(&checklist)?;
            print!("{}", format::format_checklist_markdown(&checklist));
        }

        Command::Share { checklist } => {
            let checklist = db.resolve_checklist(&checklist)?;
            println!("{}", format::share_text(&checklist));
        }

        Command::Create { title, category } => {
            let title = title.trim();
            if title.is_empty() {
                bail!("checklist title must not be empty");
            }
            let checklist =
                Checklist::new(title, parse_category(&category)?, InputSource::Text);
            db.insert_checklist(&checklist)?;
            println!("Created checklist {}", short_id(&checklist));
        }

        Command::Add {
            checklist,
            name,
            note,
            priority,
        } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("item name must not be empty");
            }
            let mut checklist = db.resolve_checklist(&checklist)?;
            checklist.add_item(ChecklistItem::new(name, note, parse_priority(&priority)?));
            db.save_checklist(&checklist)?;
            println!(
                "Added '{}' to {} ({} items)",
                name,
                checklist.title,
                checklist.total_count()
            );
        }

        Command::Toggle {
            checklist,
            position,
        } => {
            let mut checklist = db.resolve_checklist(&checklist)?;
            let item_id = item_id_at(&checklist, position)?;
            let completed = checklist
                .toggle_item(&item_id)
                .ok_or_else(|| anyhow!("no item at position {position}"))?;
            db.save_checklist(&checklist)?;
            let mark = if completed { "✓" } else { "○" };
            println!(
                "{} {}/{} done",
                mark,
                checklist.completed_count(),
                checklist.total_count()
            );
        }

        Command::Edit {
            checklist,
            position,
            name,
            note,
            priority,
        } => {
            if let Some(ref name) = name {
                if name.trim().is_empty() {
                    bail!("item name must not be empty");
                }
            }
            let mut checklist = db.resolve_checklist(&checklist)?;
            let item_id = item_id_at(&checklist, position)?;
            // an empty --note clears the note
            let note = note.map(|n| if n.is_empty() { None } else { Some(n) });
            let priority = priority.as_deref().map(parse_priority).transpose()?;
            checklist.update_item(&item_id, name, note, priority);
            db.save_checklist(&checklist)?;
            println!("Updated item {position} of {}", checklist.title);
        }

        Command::Remove {
            checklist,
            position,
        } => {
            let mut checklist = db.resolve_checklist(&checklist)?;
            let item_id = item_id_at(&checklist, position)?;
            checklist.remove_item(&item_id);
            db.save_checklist(&checklist)?;
            println!(
                "Removed item {position} from {} ({} left)",
                checklist.title,
                checklist.total_count()
            );
        }

        Command::Move {
            checklist,
            from,
            to,
        } => {
            let mut checklist = db.resolve_checklist(&checklist)?;
            if from == 0 || to == 0 {
                bail!("item positions start at 1");
            }
            if from > checklist.total_count() || to > checklist.total_count() {
                bail!(
                    "positions out of range (checklist has {} items)",
                    checklist.total_count()
                );
            }
            // 1-based "move to position t" is a move-before-destination with
            // the block removed first, so the target index needs the +1 when
            // moving downward.
            let destination = if to > from { to } else { to - 1 };
            checklist.move_items(&[from - 1], destination);
            db.save_checklist(&checklist)?;
            println!("Moved item {from} to position {to}");
        }

        Command::Rename { checklist, title } => {
            let mut checklist = db.resolve_checklist(&checklist)?;
            if !checklist.set_title(&title) {
                bail!("checklist title must not be empty");
            }
            db.save_checklist(&checklist)?;
            println!("Renamed to {}", checklist.title);
        }

        Command::Recategorize {
            checklist,
            category,
        } => {
            let mut checklist = db.resolve_checklist(&checklist)?;
            checklist.set_category(parse_category(&category)?);
            db.save_checklist(&checklist)?;
            println!(
                "{} is now in {}",
                checklist.title,
                checklist.category.as_str()
            );
        }

        Command::Delete { checklist } => {
            let checklist = db.resolve_checklist(&checklist)?;
            db.delete_checklist(&checklist.id)?;
            println!("Deleted {}", checklist.title);
        }

        Command::Capture { text, file, source } => {
            let input = read_capture_input(text, file)?;
            let source = parse_capture_source(&source)?;
            let service = OllamaService::new(&config.model.base_url, &config.model.model);

            let extraction = service.extract(&input, source).await?;
            let checklist = Checklist::from_extraction(&extraction, source);
            db.insert_checklist(&checklist)?;

            print!("{}", format::format_checklist_markdown(&checklist));
            println!("Saved checklist {}", short_id(&checklist));
        }

        Command::Generate { condition } => {
            let condition = condition.trim();
            if condition.is_empty() {
                bail!("condition must not be empty");
            }
            let service = OllamaService::new(&config.model.base_url, &config.model.model);

            let generation = service.generate(condition).await?;
            let checklist = Checklist::from_generation(&generation);
            db.insert_checklist(&checklist)?;

            print!("{}", format::format_checklist_markdown(&checklist));
            if let Some(ref tips) = generation.tips {
                println!("\nTips: {tips}");
            }
            println!("Saved checklist {}", short_id(&checklist));
        }

        Command::Serve { port } => {
            let port = port.unwrap_or(config.widget.port);
            let refresh = Duration::from_secs(config.widget.refresh_seconds);
            let bus = ChangeBus::new();
            ticklist::widget::serve(Arc::new(db), bus, port, refresh).await?;
        }
    }

    Ok(())
}

/// Map a displayed 1-based position to the item id at that spot.
fn item_id_at(checklist: &Checklist, position: usize) -> Result<String> {
    if position == 0 {
        bail!("item positions start at 1");
    }
    let sorted = checklist.sorted_items();
    sorted
        .get(position - 1)
        .map(|item| item.id.clone())
        .ok_or_else(|| {
            anyhow!(
                "no item at position {position} (checklist has {} items)",
                sorted.len()
            )
        })
}

fn short_id(checklist: &Checklist) -> &str {
    &checklist.id[..8.min(checklist.id.len())]
}

fn parse_category(s: &str) -> Result<Category> {
    let category = Category::parse(s);
    if category == Category::Other && !s.eq_ignore_ascii_case("other") {
        bail!("unknown category '{s}' (expected shopping, task, procedure, travel, cooking, or other)");
    }
    Ok(category)
}

fn parse_priority(s: &str) -> Result<Priority> {
    match s.to_lowercase().as_str() {
        "high" => Ok(Priority::High),
        "medium" => Ok(Priority::Medium),
        "low" => Ok(Priority::Low),
        _ => bail!("unknown priority '{s}' (expected high, medium, or low)"),
    }
}

fn parse_capture_source(s: &str) -> Result<InputSource> {
    match s.to_lowercase().as_str() {
        "text" => Ok(InputSource::Text),
        "photo" => Ok(InputSource::Photo),
        "voice" => Ok(InputSource::Voice),
        _ => bail!("unsupported capture source '{s}' (expected text, photo, or voice)"),
    }
}

fn read_capture_input(text: Option<String>, file: Option<std::path::PathBuf>) -> Result<String> {
    let input = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)?,
        (None, None) => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let input = input.trim().to_string();
    if input.is_empty() {
        bail!("no input text provided");
    }
    Ok(input)
}
