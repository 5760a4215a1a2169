//! Fee tracker CLI.
//!
//! # Responsibility
//! - Compose config, logging, storage and a notifier around `feeapp_core`.
//! - Render roster and notice results as plain text.
//!
//! Notices go through the preview notifier; no real transport is wired here.

mod cli;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Args, Command};
use feeapp_core::db::open_db;
use feeapp_core::{
    init_logging, AppConfig, Notifier, PreviewNotifier, SqliteStudentRepository,
    StudentRepository, StudentService,
};
use log::info;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let repo = SqliteStudentRepository::new(&conn);
    let mut service = StudentService::open(repo, PreviewNotifier::new())?;
    info!(
        "event=cli_run module=cli status=start roster_count={}",
        service.roster().len()
    );

    run(&mut service, args.command)
}

fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.parse()?;
    }
    if let Some(log_dir) = &args.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    Ok(config)
}

fn run<R, N>(service: &mut StudentService<R, N>, command: Command) -> Result<()>
where
    R: StudentRepository,
    N: Notifier,
{
    match command {
        Command::Add {
            name,
            phone,
            admission_date,
        } => {
            let student = service.add_student(name, phone, &admission_date)?;
            println!(
                "added id={} name={} admission={}",
                student.id.unwrap_or_default(),
                student.name,
                student.admission_date_iso()
            );
        }
        Command::List { today } => {
            let today = today.unwrap_or_else(local_today);
            for summary in service.fee_summaries(today) {
                let student = summary.student;
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    student.id.unwrap_or_default(),
                    student.name,
                    student.phone,
                    student.admission_date_iso(),
                    summary.fee_month.name()
                );
            }
        }
        Command::Notify { id, notice, today } => {
            let student = service
                .find_by_id(id)
                .ok_or_else(|| anyhow!("no student with id {id}"))?;
            let today = today.unwrap_or_else(local_today);
            let sent = service.notify_fee(student, notice, today)?;
            println!("To: {}\nMessage: {}", sent.recipient, sent.message);
        }
        Command::Message { name, text } => {
            let student = service
                .find_by_name(&name)
                .ok_or_else(|| anyhow!("no student named {name}"))?;
            service.send_custom(student, &text)?;
            println!("To: {}\nMessage: {}", student.phone, text);
        }
    }
    Ok(())
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
