use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;
use vscode_pageobjects::{
    EokaDriver, Error, Locators, NotificationType, Result, WaitOptions, Workbench,
};

#[derive(Parser)]
#[command(name = "vscode-po")]
#[command(about = "Inspect and drive a running VS Code for the Web")]
#[command(version)]
struct Cli {
    /// URL of the VS Code for the Web instance
    #[arg(long, global = true)]
    url: Option<String>,

    /// VS Code release whose locators to use (default: newest bundled)
    #[arg(long = "vscode-version", value_name = "VERSION", global = true)]
    vscode_version: Option<String>,

    /// Extra locator table layered over the bundled one
    #[arg(long, value_name = "FILE", global = true)]
    locators: Option<PathBuf>,

    /// Run the browser in headless mode
    #[arg(long, global = true)]
    headless: bool,

    /// Wait timeout in milliseconds
    #[arg(long, default_value_t = 5000, global = true)]
    timeout: u64,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved locator table (no browser needed)
    Locators,

    /// List notifications from the notifications center
    Notifications {
        /// info, warning, error or any
        #[arg(long, default_value = "any")]
        kind: String,
    },

    /// Clear all notifications
    ClearNotifications,

    /// Find and select a quick pick row by label
    QuickPick {
        label: String,

        /// Open the command palette first
        #[arg(long)]
        command_prompt: bool,
    },

    /// Show the open modal dialog, optionally pushing a button
    Dialog {
        #[arg(long, value_name = "LABEL")]
        push: Option<String>,
    },

    /// List source control changes per provider
    Scm {
        /// List staged changes instead of unstaged ones
        #[arg(long)]
        staged: bool,
    },

    /// List launch configurations, optionally selecting one
    DebugConfigs {
        #[arg(long, value_name = "LABEL")]
        select: Option<String>,
    },
}

fn resolve_locators(cli: &Cli) -> Result<Locators> {
    let mut table = match cli.vscode_version {
        Some(ref v) => Locators::for_version(v)?,
        None => Locators::latest()?,
    };
    if let Some(ref path) = cli.locators {
        debug!("Layering locators from {}", path.display());
        table.merge(Locators::load(path)?);
        table.validate()?;
    }
    Ok(table)
}

fn print_locators(locators: &Locators) -> Result<()> {
    println!("# VS Code {}", locators.version);
    print!("{}", locators.to_yaml()?);
    Ok(())
}

async fn run(cli: &Cli, workbench: &Workbench<'_, EokaDriver<'_>>) -> Result<()> {
    match cli.command {
        Command::Locators => print_locators(workbench.locators())?,

        Command::Notifications { ref kind } => {
            let kind: NotificationType = kind.parse()?;
            let center = workbench.open_notifications_center().await?;
            let notifications = center.notifications(kind).await?;
            println!("{} notification(s)", notifications.len());
            for n in notifications {
                let source = n.source().await?.unwrap_or_default();
                println!("  [{}] {}  {}", n.kind().await?, n.message().await?, source);
                for action in n.actions().await? {
                    println!("      - {}", action.label().await?);
                }
            }
        }

        Command::ClearNotifications => {
            let center = workbench.open_notifications_center().await?;
            center.clear_all().await?;
            println!("✓ Cleared");
        }

        Command::QuickPick {
            ref label,
            command_prompt,
        } => {
            let input = if command_prompt {
                workbench.open_command_prompt().await?
            } else {
                workbench.quick_open_box().await?
            };
            if !input.select_quick_pick(label.as_str()).await? {
                return Err(Error::NotFound(format!("quick pick '{}'", label)));
            }
            println!("✓ Selected {}", label);
        }

        Command::Dialog { ref push } => {
            let dialog = workbench.modal_dialog().await?;
            println!("{}", dialog.message().await?);
            let details = dialog.details().await?;
            if !details.is_empty() {
                println!("  {}", details);
            }
            println!("  Buttons: {}", dialog.button_labels().await?.join(", "));
            if let Some(label) = push {
                dialog.push_button(label).await?;
                println!("✓ Pushed {}", label);
            }
        }

        Command::Scm { staged } => {
            let view = workbench.scm_view().await?;
            for provider in view.providers().await? {
                let kind = provider.kind().await?.unwrap_or_default();
                println!(
                    "{} {} ({} {})",
                    provider.title().await?,
                    kind,
                    provider.change_count(staged).await?,
                    if staged { "staged" } else { "changes" }
                );
                for change in provider.changes(staged).await? {
                    let description = change.description().await?.unwrap_or_default();
                    println!(
                        "  {:<12} {} {}",
                        change.status().await?,
                        change.label().await?,
                        description
                    );
                }
            }
        }

        Command::DebugConfigs { ref select } => {
            let view = workbench.debug_view().await?;
            if let Some(label) = select {
                view.select_launch_configuration(label).await?;
            }
            let selected = view.launch_configuration().await?;
            for config in view.launch_configurations().await? {
                let mark = if selected.as_deref() == Some(config.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}", mark, config);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let locators = resolve_locators(&cli).context("failed to resolve locator table")?;

    if let Command::Locators = cli.command {
        print_locators(&locators)?;
        return Ok(());
    }

    let url = cli
        .url
        .as_deref()
        .ok_or_else(|| Error::Config("--url is required for this command".into()))?;

    let stealth = eoka::StealthConfig {
        headless: cli.headless,
        ..Default::default()
    };
    debug!("Launching browser (headless: {})", cli.headless);
    let browser = eoka::Browser::launch_with_config(stealth).await?;
    let page = match browser.new_page(url).await {
        Ok(page) => page,
        Err(e) => {
            browser.close().await?;
            return Err(e).with_context(|| format!("failed to open {}", url));
        }
    };

    let workbench = Workbench::new(EokaDriver::new(&page), &locators)
        .with_wait_options(WaitOptions::timeout(cli.timeout));
    let result = run(&cli, &workbench).await;

    browser.close().await?;

    if let Err(e) = result {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
    Ok(())
}
