use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stacktrack::{api, client::StackClient, config::Config, stack};

#[derive(Parser)]
#[command(name = "stk")]
#[command(about = "Track stacked git branches and verify their ancestry")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides STACKTRACK_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List projects on the server
    Projects,
    /// Show a feature's stack as a tree
    Stack { project: i64, feature: i64 },
    /// Print the git commands that verify a feature's stack
    Verify {
        project: i64,
        feature: i64,
        /// Print only the single-line form
        #[arg(long)]
        one_liner: bool,
    },
    /// Reorder a feature's stack, bottom first
    Reorder {
        project: i64,
        feature: i64,
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Print git commands comparing two branches (no server needed)
    Compare { parent: String, child: String },
}

/// Initialize tracing to stdout for the server or stderr for client commands.
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "stacktrack=debug,tower_http=debug".into()),
    );

    if use_stderr {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(config: Config, port: Option<u16>) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.port);
    tracing::info!("Starting stacktrack server on port {}", port);

    let db = config.open_database()?;
    let app = api::create_router_with_config(db, &config);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("stacktrack server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    let config = Config::from_env();

    match cli.command {
        None => serve(config, None).await?,
        Some(Commands::Serve { port }) => serve(config, port).await?,
        Some(Commands::Projects) => {
            let client = StackClient::new(config.server_url);
            for summary in client.list_projects().await? {
                println!(
                    "{:>4}  {} ({} features, {} branches, base {})",
                    summary.project.id,
                    summary.project.name,
                    summary.feature_count,
                    summary.branch_count,
                    summary.project.master_branch
                );
            }
        }
        Some(Commands::Stack { project, feature }) => {
            let client = StackClient::new(config.server_url);
            let feature = client.get_feature(project, feature).await?;
            println!("{} {}", feature.feature.identifier, feature.feature.name);
            print!(
                "{}",
                stack::render_stack(&feature.base_branch, &feature.branches)
            );
        }
        Some(Commands::Verify {
            project,
            feature,
            one_liner,
        }) => {
            let client = StackClient::new(config.server_url);
            let verification = client.verify_stack(project, feature).await?;
            if one_liner {
                println!("{}", verification.one_liner);
            } else {
                println!("{}", verification.script);
            }
        }
        Some(Commands::Reorder {
            project,
            feature,
            ids,
        }) => {
            let client = StackClient::new(config.server_url);
            let branches = client.reorder_branches(project, feature, ids).await?;
            for branch in branches.iter().filter(|b| b.is_stacked()) {
                println!("{:>3}. {}", branch.position, branch.name);
            }
        }
        Some(Commands::Compare { parent, child }) => {
            for command in stack::comparison_commands(&parent, &child) {
                let marker = if command.mutates { " (modifies repo)" } else { "" };
                println!("# {}{}", command.label, marker);
                println!("{}", command.command);
            }
        }
    }

    Ok(())
}
