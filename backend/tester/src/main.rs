//! Smoke test against a running back-office.
//!
//! Logs in, creates a batch of sample products, files them into a section,
//! records some page views and prints what the API reports back.
use anyhow::{Context, Result, bail, ensure};
use catalog::{
    Vocabulary,
    products::{ColorName, Season, expected_sizes},
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Manager or admin email
    email: String,

    password: String,

    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// How many sample products to create
    #[arg(long, default_value_t = 12)]
    products: usize,

    #[arg(long, default_value_t = 25)]
    visits: usize,

    /// Delete the created products again at the end
    #[arg(long)]
    cleanup: bool,
}

struct Api {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl Api {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and unwraps the `data` of a successful envelope.
    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Response with status {status} is not JSON"))?;

        if !status.is_success() {
            bail!("Request failed with {status}: {}", body["errors"]);
        }

        Ok(body["data"].clone())
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.send(self.request(Method::DELETE, path)).await
    }
}

fn sample_product(index: usize) -> Value {
    let unisex = index % 3 == 0;
    let colors = ColorName::ALL;
    let seasons = Season::ALL;

    let sizes: Vec<Value> = expected_sizes(unisex)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let quantity = (index + i) % 7;
            let availability = if quantity == 0 {
                "out_of_stock"
            } else {
                "in_stock"
            };
            json!({ "name": name, "quantity": quantity, "availability": availability })
        })
        .collect();

    json!({
        "name": format!("Sample Jumper {index}"),
        "description": "Smoke test product",
        "descriptionText": "Created by the smoke tester and safe to delete.",
        "unisex": unisex,
        "woolPercentage": 50 + (index % 6) * 10,
        "price": 79.0 + index as f64,
        "releaseDate": "2026-09-01",
        "availability": "in_stock",
        "seasons": [seasons[index % seasons.len()].as_str()],
        "colors": [
            { "name": colors[index % colors.len()].as_str(), "sizes": sizes.clone() },
            { "name": colors[(index + 1) % colors.len()].as_str(), "sizes": sizes },
        ]
    })
}

fn progress(len: usize, message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );
    pb.set_message(message);

    Ok(pb)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut api = Api {
        client: Client::new(),
        base_url: args.base_url.trim_end_matches('/').to_string(),
        token: None,
    };

    let health = api.get("/api/health").await.context("Server is not reachable")?;
    println!("Health: {health}");

    let login = api
        .post(
            "/api/auth/login",
            &json!({ "email": args.email, "password": args.password }),
        )
        .await
        .context("Login failed")?;
    api.token = login["token"].as_str().map(str::to_string);
    ensure!(api.token.is_some(), "Login response carried no token");

    let me = api.get("/api/auth/me").await?;
    println!("Logged in as {} ({})\n", me["fullName"], me["role"]);

    let pb = progress(args.products, "creating products")?;
    let mut created = Vec::with_capacity(args.products);
    for index in 0..args.products {
        let product = api.post("/api/product", &sample_product(index)).await?;
        let id = product["_id"]
            .as_str()
            .context("Created product has no id")?
            .to_string();
        created.push(id);
        pb.inc(1);
    }
    pb.finish_with_message("products created");

    let sections = api.get("/api/section").await?;
    let section = sections
        .as_array()
        .and_then(|sections| sections.first())
        .context("No sections returned")?;
    let section_id = section["_id"].as_str().context("Section has no id")?;

    let picks: Vec<&String> = created.iter().take(4).collect();
    api.put(&format!("/api/section/{section_id}"), &json!({ "items": picks }))
        .await?;
    let section = api.get(&format!("/api/section/{section_id}")).await?;
    println!(
        "\nSection {} lists {} products",
        section["name"], section["items"]["totalItems"]
    );

    let pb = progress(args.visits, "recording visits")?;
    for _ in 0..args.visits {
        api.post("/api/traffic", &json!({})).await?;
        pb.inc(1);
    }
    pb.finish_with_message("visits recorded");

    let traffic = api.get("/api/traffic").await?;
    println!(
        "\nTraffic {}: {} (previous month {}: {})",
        traffic["month"], traffic["count"], traffic["previousMonth"], traffic["previousCount"]
    );

    let feed = api.get("/api/notification?limit=5").await?;
    println!("Unread notifications: {}", feed["unreadCount"]);
    for notification in feed["items"].as_array().into_iter().flatten() {
        println!("  [{}] {}", notification["title"], notification["message"]);
    }

    if args.cleanup {
        let pb = progress(created.len(), "deleting products")?;
        for id in &created {
            api.delete(&format!("/api/product/{id}")).await?;
            pb.inc(1);
        }
        pb.finish_with_message("products deleted");

        let section = api.get(&format!("/api/section/{section_id}")).await?;
        println!(
            "Section {} lists {} products after cleanup",
            section["name"], section["items"]["totalItems"]
        );
    }

    Ok(())
}
