use anyhow::{bail, Context};
use canteen_shared::{
    DashboardResponse, ErrorResponse, MealSlot, MenuItems, MenuResponse, NotificationResponse,
    SaveMenuRequest, TemplateResponse,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Parser)]
#[command(name = "canteen-cli")]
#[command(about = "Admin CLI for the canteen backend")]
#[command(
    long_about = "A command-line interface for canteen administration.\n\n\
    Triggers reminder passes, sends broadcasts, and reads or edits menus\n\
    through the backend HTTP API."
)]
struct Cli {
    /// Backend server URL to connect to.
    #[arg(
        short,
        long,
        default_value = "http://localhost:8080",
        env = "CANTEEN_API_URL"
    )]
    base_url: String,

    /// Bearer token: an admin session token, or the reminder trigger token
    /// for `remind`.
    #[arg(short, long, env = "CANTEEN_API_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send today's reminder to office users who have not responded
    ///
    /// Each call sends again; the server's own schedule runs once per day.
    Remind,

    /// Send a message to every subscribed user
    Broadcast {
        /// Message body shown in the notification.
        message: String,
    },

    /// Show response and opt-in counts for a date
    Dashboard {
        /// Date as YYYY-MM-DD. Defaults to today in the organization timezone.
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Read or edit the daily menu
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },

    /// List the weekly menu templates
    Templates,
}

#[derive(Subcommand)]
enum MenuAction {
    /// Show the menu the planner would pre-fill for a date
    Show { date: NaiveDate },

    /// Save the menu for a date. Omitted meals are saved empty.
    Set {
        date: NaiveDate,
        #[arg(long)]
        breakfast: Option<String>,
        #[arg(long)]
        lunch: Option<String>,
        #[arg(long)]
        snack: Option<String>,
        #[arg(long)]
        dinner: Option<String>,
    },

    /// Fill a date's menu from its weekday template
    Autofill { date: NaiveDate },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = Api {
        client: Client::new(),
        base_url: cli.base_url.trim_end_matches('/').to_string(),
        token: cli.token,
    };

    match cli.command {
        Commands::Remind => {
            let response: NotificationResponse = api
                .send(api.post("/api/notifications/reminders"))
                .await?;
            print_notification(&response);
        }
        Commands::Broadcast { message } => {
            let response: NotificationResponse = api
                .send(
                    api.post("/api/notifications/broadcast")
                        .json(&json!({ "message": message })),
                )
                .await?;
            print_notification(&response);
        }
        Commands::Dashboard { date } => {
            let mut request = api.get("/api/admin/dashboard");
            if let Some(date) = date {
                request = request.query(&[("date", date.to_string())]);
            }
            let dashboard: DashboardResponse = api.send(request).await?;
            println!("Date:       {}", dashboard.date);
            println!("Responded:  {}", dashboard.responded);
            println!("Breakfast:  {}", dashboard.breakfast);
            println!("Lunch:      {}", dashboard.lunch);
            println!("Snack:      {}", dashboard.snack);
            println!("Dinner:     {}", dashboard.dinner);
            println!(
                "Reminders:  {} pending of {} subscribed office users",
                dashboard.pending_reminders, dashboard.subscribed_office_users
            );
        }
        Commands::Menu { action } => handle_menu(&api, action).await?,
        Commands::Templates => {
            let templates: Vec<TemplateResponse> = api.send(api.get("/api/admin/templates")).await?;
            for template in templates {
                println!("{}", template.day_name);
                print_items(&template.items);
            }
        }
    }

    Ok(())
}

async fn handle_menu(api: &Api, action: MenuAction) -> anyhow::Result<()> {
    let menu: MenuResponse = match action {
        MenuAction::Show { date } => api.send(api.get(&format!("/api/admin/menus/{}", date))).await?,
        MenuAction::Set {
            date,
            breakfast,
            lunch,
            snack,
            dinner,
        } => {
            let req = SaveMenuRequest {
                item_breakfast: breakfast,
                item_lunch: lunch,
                item_snack: snack,
                item_dinner: dinner,
            };
            api.send(api.put(&format!("/api/admin/menus/{}", date)).json(&req))
                .await?
        }
        MenuAction::Autofill { date } => {
            api.send(api.post(&format!("/api/admin/menus/{}/autofill", date)))
                .await?
        }
    };

    println!("{} ({:?})", menu.date, menu.source);
    print_items(&menu.items);
    Ok(())
}

struct Api {
    client: Client,
    base_url: String,
    token: String,
}

impl Api {
    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&self.token)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(&self.token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> anyhow::Result<T> {
        let response = request.send().await.context("Failed to reach backend")?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => match err.details {
                    Some(details) => bail!("{}: {} ({})", status, err.error, details),
                    None => bail!("{}: {}", status, err.error),
                },
                Err(_) => bail!("{}: {}", status, text),
            }
        }

        response.json().await.context("Unexpected response body")
    }
}

fn print_notification(response: &NotificationResponse) {
    println!("{}", response.message);
    let report = &response.report;
    if report.failed > 0 {
        println!(
            "    {} attempted, {} failed, {} expired subscriptions removed",
            report.attempted, report.failed, report.pruned
        );
        for failure in &report.failures {
            println!("    [{}] {}", &failure.user_id.to_string()[..8], failure.reason);
        }
    }
}

fn print_items(items: &MenuItems) {
    for slot in MealSlot::ALL {
        let label = format!("{}:", slot.as_str());
        println!("    {:<11}{}", label, items.get(slot));
    }
}
