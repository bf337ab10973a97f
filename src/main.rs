use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use taco_cloud::security::hash_password;
use taco_cloud::{
    count_rows, import_ingredients, load_ingredients_csv, open_database, seed_ingredients, Config,
    OrderRepository, TacoRepository, UserRepository, DEFAULT_CONFIG_PATH, DEFAULT_ROLE,
    RECENT_PAGE_SIZE,
};

const USAGE: &str = "Usage: taco-cloud [--config <path>] <command>

Commands:
  init                                   Create the schema and seed ingredients
  import-ingredients <csv>               Import ingredients (id,name,type)
  add-user <username> <password> [name]  Register a USER account
  recent                                 Show the most recent tacos
  show-order <id>                        Show a stored order";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            bail!("--config needs a path\n\n{}", USAGE);
        }
        config_path = args.remove(1);
        args.remove(0);
    }
    let config = Config::load_or_default(&config_path)?;

    match args.first().map(String::as_str) {
        Some("init") => run_init(&config),
        Some("import-ingredients") => match args.get(1) {
            Some(csv) => run_import(&config, Path::new(csv)),
            None => bail!("import-ingredients needs a CSV path\n\n{}", USAGE),
        },
        Some("add-user") => match (args.get(1), args.get(2)) {
            (Some(username), Some(password)) => {
                let full_name = args[3..].join(" ");
                run_add_user(&config, username, password, &full_name)
            }
            _ => bail!("add-user needs a username and a password\n\n{}", USAGE),
        },
        Some("recent") => run_recent(&config),
        Some("show-order") => {
            let id: i64 = args
                .get(1)
                .context("show-order needs an order id")?
                .parse()
                .context("order id must be a number")?;
            run_show_order(&config, id)
        }
        _ => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}

fn run_init(config: &Config) -> Result<()> {
    println!("🌮 Taco Cloud - database setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let conn = open_database(&config.database.path)?;
    println!("✓ Schema ready at {:?}", config.database.path);

    let inserted = seed_ingredients(&conn)?;
    println!("✓ Seeded {} new ingredients", inserted);
    println!("✓ Database contains {} ingredients", count_rows(&conn, "ingredient")?);

    Ok(())
}

fn run_import(config: &Config, csv_path: &Path) -> Result<()> {
    println!("\n📂 Loading CSV...");
    let ingredients = load_ingredients_csv(csv_path)?;
    println!("✓ Loaded {} ingredients from CSV", ingredients.len());

    let conn = open_database(&config.database.path)?;
    let inserted = import_ingredients(&conn, &ingredients)?;

    println!("✓ Inserted: {} ingredients", inserted);
    println!("✓ Skipped duplicates: {}", ingredients.len() - inserted);
    Ok(())
}

fn run_add_user(config: &Config, username: &str, password: &str, full_name: &str) -> Result<()> {
    let conn = open_database(&config.database.path)?;
    let repo = UserRepository::new(&conn);

    if repo.find_by_username(username)?.is_some() {
        bail!("user '{}' already exists", username);
    }

    let hash = hash_password(password, config.security.bcrypt_cost)?;
    let user = repo.save(username, &hash, full_name, DEFAULT_ROLE)?;

    println!("✓ Created user '{}' (id {}, role {})", user.username, user.id, user.role);
    Ok(())
}

fn run_recent(config: &Config) -> Result<()> {
    let conn = open_database(&config.database.path)?;
    let tacos = TacoRepository::new(&conn).find_recent(RECENT_PAGE_SIZE)?;

    if tacos.is_empty() {
        println!("No tacos designed yet.");
        return Ok(());
    }

    for taco in tacos {
        let ingredients: Vec<&str> = taco.ingredients.iter().map(|i| i.name.as_str()).collect();
        println!(
            "#{:<5} {:<24} {}  [{}]",
            taco.id.unwrap_or_default(),
            taco.name,
            taco.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ingredients.join(", ")
        );
    }

    Ok(())
}

fn run_show_order(config: &Config, id: i64) -> Result<()> {
    let conn = open_database(&config.database.path)?;

    let Some(order) = OrderRepository::new(&conn).find_by_id(id)? else {
        bail!("order {} not found", id);
    };

    println!("{}", serde_json::to_string_pretty(&order)?);
    Ok(())
}
