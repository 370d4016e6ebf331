use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use movie_recs::{AppResult, Config, Movie, RecommendationService, User};

#[derive(Parser, Debug)]
#[command(
    name = "movie-recs",
    version,
    about = "Movie recommendations from a Neo4j movie graph"
)]
struct Cli {
    #[arg(long, global = true, help = "Print results as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend movies for a user (by-user) or similar to a movie (by-movie)
    Recommend {
        #[arg(value_name = "KIND")]
        kind: String,
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Look up a movie
    Movie(MovieLookup),
    /// Look up a user
    User(UserLookup),
    /// Create or rename a user
    AddUser {
        #[arg(value_name = "ID")]
        id: i64,
        #[arg(value_name = "USERNAME")]
        username: String,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct MovieLookup {
    #[arg(long, help = "Exact movie title")]
    title: Option<String>,

    #[arg(long, help = "Movie id")]
    id: Option<i64>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct UserLookup {
    #[arg(long, help = "Username")]
    name: Option<String>,

    #[arg(long, help = "User id")]
    id: Option<i64>,
}

enum Output {
    Movies(Vec<Movie>),
    Movie(Option<Movie>),
    User(Option<User>),
    Done,
}

async fn run(service: &RecommendationService, command: Command) -> AppResult<Output> {
    match command {
        Command::Recommend { kind, id } => service
            .get_recommendations_for(&kind, id)
            .await
            .map(Output::Movies),
        Command::Movie(MovieLookup { title: Some(title), .. }) => service
            .find_movie_by_title(&title)
            .await
            .map(Output::Movie),
        Command::Movie(MovieLookup { id, .. }) => match id {
            Some(id) => service.find_movie_by_id(id).await.map(Output::Movie),
            None => Ok(Output::Movie(None)),
        },
        Command::User(UserLookup { name: Some(name), .. }) => service
            .find_user_by_name(&name)
            .await
            .map(Output::User),
        Command::User(UserLookup { id, .. }) => match id {
            Some(id) => service.find_user_by_id(id).await.map(Output::User),
            None => Ok(Output::User(None)),
        },
        Command::AddUser { id, username } => service
            .add_user(id, &username)
            .await
            .map(|()| Output::Done),
    }
}

fn print(output: &Output, json: bool) -> anyhow::Result<()> {
    match (output, json) {
        (Output::Movies(movies), true) => println!("{}", serde_json::to_string_pretty(movies)?),
        (Output::Movies(movies), false) => {
            for movie in movies {
                println!("{}", movie);
            }
        }
        (Output::Movie(movie), true) => println!("{}", serde_json::to_string_pretty(movie)?),
        (Output::Movie(Some(movie)), false) => println!("{}", movie),
        (Output::User(user), true) => println!("{}", serde_json::to_string_pretty(user)?),
        (Output::User(Some(user)), false) => println!("{}", user),
        (Output::Movie(None), false) | (Output::User(None), false) => println!("not found"),
        (Output::Done, _) => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("movie_recs=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let service = movie_recs::connect(&config).context("Failed to configure Neo4j store")?;
    tracing::info!(uri = %config.neo4j_uri, "Connected recommendation service");

    let outcome = run(&service, cli.command).await;
    let output = service.finish(outcome).await?;

    print(&output, cli.json)
}
