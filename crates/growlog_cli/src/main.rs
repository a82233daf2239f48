//! growlog command-line utility.
//!
//! `growlog token` mints auth tokens for scripting against a running
//! deployment; `growlog demo` walks a two-device sync session against
//! an in-memory store and prints every request and response.

use clap::{Parser, Subcommand};
use growlog_engine::Engine;
use growlog_model::{EndId, UserId};
use growlog_server::{handle, Claims, DiaryService, Response, TokenSigner};
use growlog_store::MemoryStore;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "growlog", version, about = "growlog diary sync utility")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mint a hex auth token for a user and optional end.
    Token {
        /// Signing secret shared with the deployment.
        #[arg(long)]
        secret: String,
        /// User UUID.
        #[arg(long)]
        user: String,
        /// End UUID; omit for a login-scoped token.
        #[arg(long)]
        end: Option<String>,
    },
    /// Run a scripted two-device sync session against an in-memory
    /// store.
    Demo,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Token { secret, user, end } => token(&secret, &user, end.as_deref()),
        Command::Demo => {
            demo();
            ExitCode::SUCCESS
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

fn token(secret: &str, user: &str, end: Option<&str>) -> ExitCode {
    let user_id = match Uuid::parse_str(user) {
        Ok(id) => UserId::new(id),
        Err(e) => {
            eprintln!("invalid user UUID: {e}");
            return ExitCode::from(2);
        }
    };
    let end_id = match end.map(Uuid::parse_str).transpose() {
        Ok(id) => id.map(EndId::new),
        Err(e) => {
            eprintln!("invalid end UUID: {e}");
            return ExitCode::from(2);
        }
    };

    let signer = TokenSigner::new(secret.as_bytes().to_vec());
    let claims = Claims {
        user_id,
        end_id,
        issued_at_ms: now_ms(),
    };
    println!("{}", signer.sign(&claims));
    ExitCode::SUCCESS
}

fn demo() {
    let engine = Engine::new(Arc::new(MemoryStore::new()));
    let svc = DiaryService::new(engine, TokenSigner::new(b"demo secret".to_vec()));

    let show = |label: &str, resp: &Response| {
        println!("{label}: {} {}", resp.status, resp.body);
    };
    let post = |path: &str, token: Option<&str>, body: serde_json::Value| {
        handle(&svc, "POST", path, token, body.to_string().as_bytes())
    };

    let resp = post(
        "/user",
        None,
        json!({"nickname": "demo grower", "password": "demo"}),
    );
    show("create user", &resp);

    let resp = post(
        "/login",
        None,
        json!({"nickname": "demo grower", "password": "demo"}),
    );
    show("login", &resp);
    let login = resp.body["token"].as_str().unwrap_or_default().to_string();

    let register = |name: &str| {
        let resp = post("/userend", Some(&login), json!({"name": name}));
        show(&format!("register {name}"), &resp);
        resp.body["token"].as_str().unwrap_or_default().to_string()
    };
    let phone = register("phone");
    let tablet = register("tablet");

    let id_of = |resp: &Response| resp.body["id"].as_str().unwrap_or_default().to_string();

    let resp = post("/box", Some(&phone), json!({"name": "tent"}));
    show("insert box", &resp);
    let box_id = id_of(&resp);
    let resp = post("/feed", Some(&phone), json!({"name": "diary"}));
    show("insert feed", &resp);
    let feed_id = id_of(&resp);
    let resp = post(
        "/plant",
        Some(&phone),
        json!({"boxID": box_id, "feedID": feed_id, "name": "northern lights"}),
    );
    show("insert plant", &resp);
    let plant_id = id_of(&resp);

    let resp = handle(&svc, "GET", "/syncPlants", Some(&tablet), b"");
    show("tablet pull", &resp);
    let resp = post(&format!("/plant/{plant_id}/sync"), Some(&tablet), json!({}));
    show("tablet ack", &resp);
    let resp = handle(&svc, "GET", "/syncPlants", Some(&tablet), b"");
    show("tablet pull again", &resp);

    let resp = post(&format!("/plant/{plant_id}/archive"), Some(&phone), json!({}));
    show("archive plant", &resp);
    let resp = handle(&svc, "GET", "/syncPlants", Some(&tablet), b"");
    show("tablet pull after archive", &resp);
}
