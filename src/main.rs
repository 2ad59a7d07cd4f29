#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleship_server::{
    init_logging, Bot, BotReport, EngineConfig, Hub, InMemoryTransport, MatchEngine, MatchId,
    MatchRegistry, Session, SessionConfig, TcpTransport, Transport, TurnRule,
};

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use log::{error, info};
#[cfg(feature = "std")]
use rand::Rng;
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Debug)]
#[cfg(feature = "std")]
struct RuleArgs {
    /// A hit lets the attacker fire again.
    #[arg(long)]
    bonus_turn: bool,
    /// Enable the square blast and radar scan abilities.
    #[arg(long)]
    abilities: bool,
    #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
    seed: Option<u64>,
}

#[cfg(feature = "std")]
impl RuleArgs {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            turn_rule: if self.bonus_turn {
                TurnRule::BonusShotOnHit
            } else {
                TurnRule::Alternate
            },
            abilities_enabled: self.abilities,
            seed: self.seed,
            ..EngineConfig::default()
        }
    }

    fn hub(&self) -> Hub {
        let registry_seed = self.seed.unwrap_or_else(|| rand::rng().random());
        Hub::new(
            MatchEngine::new(self.engine_config()),
            MatchRegistry::new(registry_seed),
        )
    }
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Accept TCP clients and host any number of matches.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[command(flatten)]
        rules: RuleArgs,
        /// Disconnect clients silent for this many seconds.
        #[arg(long)]
        idle_timeout: Option<u64>,
    },
    /// Play one bot-vs-bot match in process and print the result as JSON.
    Local {
        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Connect a bot to a running server.
    Bot {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        /// Join this match instead of creating one.
        #[arg(long)]
        join: Option<String>,
        #[arg(long, default_value = "bot")]
        name: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            rules,
            idle_timeout,
        } => {
            let hub = rules.hub();
            let session_config = SessionConfig {
                idle_timeout: idle_timeout.map(Duration::from_secs),
            };
            let listener = TcpListener::bind(&bind).await?;
            info!("listening on {}", bind);
            loop {
                let (stream, addr) = listener.accept().await?;
                info!("client connected from {}", addr);
                let session = Session::new(hub.clone(), TcpTransport::new(stream), session_config);
                tokio::spawn(async move {
                    if let Err(e) = session.run().await {
                        error!("session {} ended with an error: {}", addr, e);
                    }
                });
            }
        }
        Commands::Local { rules } => {
            let hub = rules.hub();
            let seed = rules.seed.unwrap_or_else(|| rand::rng().random());

            let (mut host_client, host_server) = InMemoryTransport::pair();
            let (mut guest_client, guest_server) = InMemoryTransport::pair();
            for transport in [host_server, guest_server] {
                let session = Session::new(hub.clone(), transport, SessionConfig::default());
                tokio::spawn(async move {
                    if let Err(e) = session.run().await {
                        error!("local session ended with an error: {}", e);
                    }
                });
            }

            let mut host = Bot::new("bot-1", "Bot One", seed);
            let mut guest = Bot::new("bot-2", "Bot Two", seed.wrapping_add(1));
            host.handshake(&mut host_client).await?;
            guest.handshake(&mut guest_client).await?;
            let match_id = host.create(&mut host_client).await?;
            guest.join(&mut guest_client, match_id.clone()).await?;

            let (host_report, guest_report) =
                tokio::try_join!(host.play(&mut host_client), guest.play(&mut guest_client))?;
            print_summary(&match_id, &[host_report, guest_report])?;
        }
        Commands::Bot {
            connect,
            join,
            name,
            seed,
        } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let mut transport = TcpTransport::connect(&connect).await?;
            let player_id = format!("{}-{:08x}", name, seed as u32);
            let mut bot = Bot::new(player_id.as_str(), name, seed);
            bot.handshake(&mut transport).await?;
            let match_id = match join {
                Some(id) => {
                    let id = MatchId::new(id);
                    bot.join(&mut transport, id.clone()).await?;
                    id
                }
                None => {
                    let id = bot.create(&mut transport).await?;
                    println!("Created match {}", id);
                    id
                }
            };
            let report = bot.play(&mut transport).await?;
            print_summary(&match_id, &[report])?;
            transport.send(battleship_server::Message::LeaveMatch).await?;
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
fn print_summary(match_id: &MatchId, reports: &[BotReport]) -> anyhow::Result<()> {
    let summary = serde_json::json!({
        "match_id": match_id,
        "players": reports,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
