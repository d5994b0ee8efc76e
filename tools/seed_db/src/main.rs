use dotenvy::dotenv;
use reqwest::Client;
use serde_json::{Map, Value};
use std::env;

/// Collections in the order they are loaded. Later ones point at ids
/// created by earlier ones.
const COLLECTIONS: &[&str] = &[
    "users",
    "courses",
    "enrollments",
    "quizzes",
    "quiz_attempts",
    "studySessions",
    "tasks",
    "notes",
    "flashcards",
    "study_goals",
    "messages",
    "chat_history",
];

/// Fields `/auth/register` takes; everything else is applied with a PATCH.
const REGISTER_FIELDS: &[&str] = &["username", "email", "password", "name"];

fn is_dry_run() -> bool {
    !env::args().any(|a| a == "--apply")
}

fn seed_file() -> String {
    env::args()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .or_else(|| env::var("SEED_FILE").ok())
        .unwrap_or_else(|| "db.json".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let base_url = env::var("STUDYPAL_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let default_password =
        env::var("SEED_DEFAULT_PASSWORD").unwrap_or_else(|_| "studypal-seed".to_string());

    let path = seed_file();
    let data: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let client = Client::new();
    let dry_run = is_dry_run();

    for &collection in COLLECTIONS {
        let Some(records) = data.get(collection).and_then(|v| v.as_array()) else {
            continue;
        };

        let mut created = 0;
        for record in records {
            let Some(fields) = record.as_object() else {
                continue;
            };
            let source_id = fields.get("id").cloned().unwrap_or(Value::Null);

            if dry_run {
                println!("[DRY RUN] Would create {} {}", collection, source_id);
                created += 1;
                continue;
            }

            let new_id = if collection == "users" {
                create_user(&client, &base_url, fields, &default_password).await?
            } else {
                // quiz attempts are recorded through grading, not posted directly
                let url = if collection == "quiz_attempts" {
                    let quiz_id = fields.get("quiz_id").cloned().unwrap_or(Value::Null);
                    format!("{}/quizzes/{}/attempts", base_url, quiz_id)
                } else {
                    format!("{}/{}", base_url, collection)
                };
                post_record(&client, &url, &without(fields, &["id"])).await?
            };

            if source_id != Value::Null && source_id != new_id {
                println!(
                    "Warning: {} {} was stored as {}; references to it will not match",
                    collection, source_id, new_id
                );
            }
            created += 1;
        }

        println!("{} created: {} / {}", collection, created, records.len());
    }

    Ok(())
}

async fn create_user(
    client: &Client,
    base_url: &str,
    fields: &Map<String, Value>,
    default_password: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut registration = Map::new();
    for &key in REGISTER_FIELDS {
        if let Some(value) = fields.get(key) {
            registration.insert(key.to_string(), value.clone());
        }
    }
    registration
        .entry("password")
        .or_insert_with(|| Value::String(default_password.to_string()));

    let url = format!("{}/auth/register", base_url);
    let id = post_record(client, &url, &registration).await?;

    let mut rest = without(fields, &["id", "password", "email", "created_at", "last_login"]);
    rest.retain(|key, _| !REGISTER_FIELDS.contains(&key.as_str()));
    if !rest.is_empty() {
        client
            .patch(format!("{}/users/{}", base_url, id))
            .json(&rest)
            .send()
            .await?
            .error_for_status()?;
    }

    Ok(id)
}

async fn post_record(
    client: &Client,
    url: &str,
    body: &Map<String, Value>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let created: Value = client
        .post(url)
        .json(body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(created.get("id").cloned().unwrap_or(Value::Null))
}

fn without(fields: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
