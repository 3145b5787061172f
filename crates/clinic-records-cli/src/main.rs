use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic_records_core::case_number;
use clinic_records_core::models::{is_intake_field, INTAKE_FIELDS};
use clinic_records_core::{
    ClinicConfig, ClinicRecords, FollowUpForm, IntakeForm, IntakeRecord, PatientSummary,
};

#[derive(Parser)]
#[command(name = "clinic-records")]
#[command(about = "Patient intake, follow-up and case report manager")]
struct Cli {
    /// Database file (overrides config and CLINIC_RECORDS_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a new patient intake
    Add {
        /// Intake field as key=value (repeatable)
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
        /// Read intake fields from a JSON object
        #[arg(long)]
        from_json: Option<PathBuf>,
    },
    /// Update an existing patient's intake
    Update {
        id: i64,
        /// Intake field as key=value (repeatable)
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
        /// Read intake fields from a JSON object
        #[arg(long)]
        from_json: Option<PathBuf>,
    },
    /// Record a follow-up visit
    Visit {
        /// Patient id
        id: i64,
        /// Visit date (defaults to today, DD-MM-YYYY)
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        complaints: String,
        #[arg(long, default_value = "")]
        modalities: String,
        /// Remedy and dose
        #[arg(long, default_value = "")]
        treatment: String,
    },
    /// Show a patient's intake record
    Show { id: i64 },
    /// List a patient's visits, newest first
    History { id: i64 },
    /// Show a single visit
    VisitDetail { visit_id: i64 },
    /// Search by case number or name
    Search { query: String },
    /// List all patients a page at a time
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    /// Permanently delete a patient and all of their visits
    Delete {
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Export a patient's full record as PDF
    Export {
        id: i64,
        /// Destination file (defaults to <name>_<case>_Full_Record.pdf)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Back up the database now
    Backup,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    let key = key.trim();
    if !is_intake_field(key) {
        return Err(format!(
            "unknown field `{key}` (expected one of: {})",
            INTAKE_FIELDS.join(", ")
        ));
    }
    Ok((key.to_string(), value.to_string()))
}

fn fill_form(
    form: &mut IntakeForm,
    fields: Vec<(String, String)>,
    from_json: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(path) = from_json {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let record = IntakeRecord::from_json(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        for (key, value) in record.iter() {
            form.set(key, value)?;
        }
    }
    for (key, value) in fields {
        form.set(&key, &value)?;
    }
    Ok(())
}

/// The case number as it was stored, in display form.
fn display_case_no(raw: &str) -> String {
    case_number::decode(&case_number::encode(raw))
}

fn print_summaries(rows: &[PatientSummary]) {
    println!(
        "{:>5}  {:<8} {:<28} {:<11} {:<5} {}",
        "ID", "Case No", "Name", "Date", "Age", "Gender"
    );
    for row in rows {
        println!(
            "{:>5}  {:<8} {:<28} {:<11} {:<5} {}",
            row.id, row.case_no, row.name, row.date, row.age, row.gender
        );
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ClinicConfig> {
    let mut config = ClinicConfig::load(cli.config.as_deref())?
        .with_env_overrides(|key| std::env::var(key).ok());
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_records_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tracing::debug!(db = %config.database_path.display(), "Configuration resolved");
    let clinic = ClinicRecords::open(config)?;

    match cli.command {
        Commands::Add { fields, from_json } => {
            let mut form = IntakeForm::new();
            fill_form(&mut form, fields, from_json)?;
            let id = clinic.save_intake(&form)?;
            let case_no = display_case_no(&form.read("case_no"));
            println!("Saved patient {id} (Case No: {case_no})");
        }
        Commands::Update {
            id,
            fields,
            from_json,
        } => {
            let mut form = clinic.intake_form(id)?;
            fill_form(&mut form, fields, from_json)?;
            clinic.update_intake(id, &form)?;
            println!("Updated patient {id}");
        }
        Commands::Visit {
            id,
            date,
            complaints,
            modalities,
            treatment,
        } => {
            let mut form = FollowUpForm::new();
            if let Some(date) = date {
                form.set("visit_date", &date)?;
            }
            form.set("complaints", &complaints)?;
            form.set("new_modalities", &modalities)?;
            form.set("treatment", &treatment)?;
            let visit_id = clinic.save_followup(Some(id), &form)?;
            println!("Saved visit {visit_id} for patient {id}");
        }
        Commands::Show { id } => {
            let record = clinic.patient_record(id)?;
            for key in INTAKE_FIELDS {
                let value = record.intake.text(key);
                if !value.is_empty() {
                    println!("{key:>15}: {}", value.replace('\n', "\n                 "));
                }
            }
            println!("{:>15}: {}", "visits", record.visits.len());
        }
        Commands::History { id } => {
            let visits = clinic.visit_history(id)?;
            if visits.is_empty() {
                println!("No visits recorded.");
            }
            for visit in visits {
                let treatment = visit.treatment.lines().next().unwrap_or_default();
                println!("{:>5}  {:<11} {}", visit.visit_id, visit.visit_date, treatment);
            }
        }
        Commands::VisitDetail { visit_id } => {
            let detail = clinic.visit_detail(visit_id)?;
            println!("Patient:        {} (Case No: {})", detail.patient_name, detail.case_no);
            println!("Visit Date:     {}", detail.visit.visit_date);
            println!("Complaints:     {}", detail.visit.complaints);
            println!("New Modalities: {}", detail.visit.new_modalities);
            println!("Treatment:      {}", detail.visit.treatment);
        }
        Commands::Search { query } => {
            let rows = clinic.search(&query)?;
            if rows.is_empty() {
                println!("No matching records.");
            } else {
                print_summaries(&rows);
            }
        }
        Commands::List { page } => {
            let page = clinic.browse(page)?;
            if !page.items.is_empty() {
                print_summaries(&page.items);
            }
            println!("{}", page.pagination.label());
        }
        Commands::Delete { id, yes } => {
            if !yes {
                bail!("refusing to delete patient {id} and all visits without --yes");
            }
            clinic.delete_patient(id)?;
            println!("Deleted patient {id}");
        }
        Commands::Export { id, out } => {
            let summary = clinic.export_report(id, out.as_deref())?;
            println!(
                "Exported {} ({} pages, {} visits)",
                summary.path.display(),
                summary.pages,
                summary.visits
            );
        }
        Commands::Backup => {
            let path = clinic.backup()?;
            println!("Backup written to {}", path.display());
        }
    }

    Ok(())
}
