use clap::Parser;
use tracing::debug;

use rustdis::config::{DEFAULT_HOST, DEFAULT_PORT};
use rustdis::encoder::inline_token;
use rustdis::{Action, Client, Config, Error};

#[derive(Parser, Debug)]
#[command(about = "Send one command to a Redis server and print the reply")]
struct Args {
    /// The server host
    #[arg(long, env = "REDIS_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// The server port
    #[arg(short, long, env = "REDIS_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Print messages published to these channels until interrupted
    #[arg(long, num_args = 1.., conflicts_with = "command")]
    subscribe: Vec<String>,

    /// The command and its arguments, e.g. `SET greeting "hello world"`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let args = Args::parse();

    let config = Config::from_env()?;
    let config = Config {
        host: args.host,
        port: args.port,
        ..config
    };
    let mut client = Client::connect(&config).await?;

    if !args.subscribe.is_empty() {
        let channels: Vec<&str> = args.subscribe.iter().map(String::as_str).collect();
        let mut subscription = client.subscription(&channels).await?;

        let token = subscription.cancellation_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });

        return subscription
            .run(|message| {
                println!("{}\n{}\n{}", message.kind, message.channel, message.payload);
                Action::Continue
            })
            .await;
    }

    if args.command.is_empty() {
        return Err(Error::Config(String::from("no command given")));
    }

    let line = args
        .command
        .iter()
        .map(|token| inline_token(token))
        .collect::<Vec<_>>()
        .join(" ");

    let reply = client.raw(line).await?;
    println!("{}", reply);

    client.close().await
}
