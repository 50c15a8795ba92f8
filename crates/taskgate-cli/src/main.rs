use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskgate_core::app::{App, AppBuilder, ImportReport};
use taskgate_core::config::TaskgateConfig;
use taskgate_core::domain::{Principal, TenantId, Variables};
use taskgate_core::impls::{InMemoryEngine, UserTaskTemplate};
use taskgate_core::query::{Pageable, TaskFilter};

const HIRE_PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL" targetNamespace="taskgate">
  <process id="hireProcess" name="Developer Hiring">
    <startEvent id="start"/>
    <userTask id="telephoneInterview" name="Telephone interview"/>
    <userTask id="techInterview" name="Tech interview"/>
    <userTask id="financialNegotiation" name="Financial negotiation"/>
    <endEvent id="end"/>
  </process>
</definitions>
"#;

#[derive(Debug, Parser)]
#[command(name = "taskgate", about = "Tenant-aware façade over a BPMN process engine")]
struct Cli {
    /// Path to taskgate.toml
    #[arg(short, long, env = "TASKGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable JSON logging
    #[arg(long, env = "TASKGATE_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy the configured artifact folders to every tenant
    Import {
        /// Fail when any unit could not be deployed
        #[arg(long)]
        strict: bool,
    },
    /// Walk through the hiring process against the in-memory engine
    Demo {
        #[arg(long, default_value = "acme")]
        tenant: String,

        #[arg(long, default_value = "phw")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TaskgateConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TaskgateConfig::default(),
    };
    init_tracing(&config, cli.json);

    let engine = Arc::new(InMemoryEngine::new());
    define_hiring_tasks(&engine).await;
    let app = AppBuilder::new(engine)
        .config(config)
        .build()
        .context("building application")?;

    match cli.command {
        Command::Import { strict } => {
            let report = app.importer().import_all().await?;
            print_report(&report);
            if strict && !report.is_clean() {
                bail!("{} of {} deployments failed", report.failure_count(), report.attempted());
            }
        }
        Command::Demo { tenant, user } => demo(&app, TenantId::new(tenant), &user).await?,
    }
    Ok(())
}

fn init_tracing(config: &TaskgateConfig, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn define_hiring_tasks(engine: &InMemoryEngine) {
    engine
        .define_user_tasks(
            "hireProcess",
            vec![UserTaskTemplate::new("Telephone interview").candidate_groups(["dev-managers"])],
        )
        .await;
    engine
        .on_complete(
            "hireProcess",
            "Telephone interview",
            vec![
                UserTaskTemplate::new("Tech interview").candidate_groups(["dev-managers"]),
                UserTaskTemplate::new("Financial negotiation").candidate_groups(["management"]),
            ],
        )
        .await;
}

fn print_report(report: &ImportReport) {
    println!(
        "import: attempted={} succeeded={} failed={}",
        report.attempted(),
        report.succeeded(),
        report.failure_count()
    );
    for failure in report.failures() {
        if let Err(reason) = &failure.result {
            println!("  {} -> {}: {}", failure.artifact, failure.tenant, reason);
        }
    }
}

async fn demo(app: &App, tenant: TenantId, user: &str) -> anyhow::Result<()> {
    let report = app.importer().import_all().await?;
    print_report(&report);

    let gateway = app.gateway();
    let admin = Principal::admin("admin");
    gateway
        .upload(
            &admin,
            Some(tenant.clone()),
            "hireProcess.bpmn20.xml",
            HIRE_PROCESS.as_bytes().to_vec(),
        )
        .await?;

    let mut variables = Variables::new();
    variables.insert("applicantName".into(), json!("John Doe"));
    variables.insert("email".into(), json!("john.doe@example.com"));
    variables.insert("phoneNumber".into(), json!("123456789"));
    let instance = gateway.start_process(&tenant, "hireProcess", variables).await?;
    println!("started {} ({})", instance.id, instance.definition_id);

    let me = Principal::user(user).with_groups(["dev-managers"]);
    let filter = TaskFilter::process_instance(instance.id.clone());
    let pageable = Pageable::default().sorted_by("name");

    let claimable = gateway
        .my_claimable_tasks(&tenant, &me, &filter, &pageable)
        .await?;
    println!("claimable by {user}: {}", serde_json::to_string_pretty(&claimable.items)?);

    let Some(first) = claimable.into_first() else {
        bail!("no claimable task for {user} in {tenant}");
    };
    if !gateway.my_claim(&tenant, &me, &first.id).await? {
        bail!("task {} could not be claimed", first.id);
    }
    println!("claimed '{}'", first.name);

    let mut outcome = Variables::new();
    outcome.insert("telephoneInterviewOutcome".into(), json!(true));
    if !gateway.my_complete(&tenant, &me, &first.id, outcome).await? {
        bail!("task {} could not be completed", first.id);
    }
    println!("completed '{}'", first.name);

    let next = gateway
        .my_claimable_tasks(&tenant, &me, &filter, &pageable)
        .await?;
    let names: Vec<&str> = next.items.iter().map(|t| t.name.as_str()).collect();
    println!("now claimable by {user}: {names:?}");
    Ok(())
}
