//! Careline command-line client.
//!
//! Usage:
//!   careline login --role doctor --email ada@example.org
//!   careline appointments
//!   careline book --doctor d1 --date 2024-01-05 --time 9:30 --reason "Check-up"
//!   careline cancel <id> [--yes]
//!   careline prescription <id> [--save-json draft.json] [--approve]

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;

use careline_lib::appointments::{
    self, AppointmentRow, CancelOutcome, ConfirmPrompt, FixedAnswer,
};
use careline_lib::auth::{
    AuthFlow, FederatedResult, FederatedResultKind, HttpIdentityProvider, LoginOutcome,
    Registration,
};
use careline_lib::booking::{self, BookingMode, BookingResult, DoctorChoice, ReasonStep, TimeInput};
use careline_lib::config::ClientConfig;
use careline_lib::format;
use careline_lib::models::{
    DiagnosisDraft, MedicalCertificate, Prescription, Receipt, ReceiptDraft, Role,
};
use careline_lib::records::{ApproveOutcome, ClinicalRecord, DiagnosisPanel, RecordPanel};
use careline_lib::{ClientError, DefaultSession};

#[derive(Parser)]
#[command(name = "careline")]
#[command(version)]
#[command(about = "Telehealth appointments and clinical records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in through the doctor or patient entry point
    Login {
        /// Entry point: doctor or patient
        #[arg(long, value_parser = parse_role)]
        role: Role,

        #[arg(long, required_unless_present = "provider")]
        email: Option<String>,

        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,

        /// Federated provider name, e.g. google
        #[arg(long, requires = "id_token", conflicts_with = "email")]
        provider: Option<String>,

        /// Id token issued by the federated provider
        #[arg(long)]
        id_token: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, value_parser = parse_role)]
        role: Role,

        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Show the signed-in account
    Whoami,

    /// List doctors available for booking
    Doctors,

    /// List your appointments
    Appointments,

    /// Show one appointment
    Show { id: String },

    /// Book a new appointment
    Book {
        #[arg(long)]
        doctor: String,

        /// YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// HH:MM, 24-hour
        #[arg(long)]
        time: String,

        #[arg(long)]
        reason: String,
    },

    /// Move an existing appointment
    Reschedule {
        id: String,

        #[arg(long)]
        doctor: String,

        #[arg(long)]
        date: String,

        #[arg(long)]
        time: String,

        /// Defaults to the appointment's current reason
        #[arg(long)]
        reason: Option<String>,
    },

    /// Cancel an appointment
    Cancel {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show or set the diagnosis of an appointment
    Diagnosis {
        id: String,

        #[arg(long)]
        set: Option<String>,

        #[arg(long, requires = "set")]
        notes: Option<String>,
    },

    /// Show, save or approve an appointment's prescription
    Prescription(RecordArgs),

    /// Show, save or approve an appointment's medical certificate
    Certificate(RecordArgs),

    /// Show, save or approve an appointment's receipt
    Receipt(RecordArgs),
}

#[derive(clap::Args)]
struct RecordArgs {
    /// Appointment id
    id: String,

    /// Save the draft in this JSON file (create or update)
    #[arg(long)]
    save_json: Option<PathBuf>,

    /// Mark the saved record as verified
    #[arg(long)]
    approve: bool,
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::from_str(s).map_err(|e| e.to_string())
}

/// Confirmation read from stdin; anything but `y`/`yes` declines.
struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, message: &str) -> bool {
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn main() -> ExitCode {
    careline_lib::init_tracing();
    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &ClientConfig) -> Result<(), ClientError> {
    let session = DefaultSession::from_config(config)?;

    match command {
        Commands::Login {
            role,
            email,
            password,
            provider,
            id_token,
        } => {
            let identity = HttpIdentityProvider::new(&config.auth_url, config.timeout)?;
            let flow = AuthFlow::new(&session, &identity);
            let outcome = match (provider, email) {
                (Some(provider), _) => flow.login_federated(
                    role,
                    &FederatedResult {
                        kind: FederatedResultKind::Success,
                        provider,
                        id_token,
                    },
                )?,
                (None, Some(email)) => {
                    let password = password_or_stdin(password)?;
                    flow.login_with_password(role, &email, &password)?
                }
                (None, None) => {
                    return Err(ClientError::Validation("Email is required".into()));
                }
            };
            match outcome {
                LoginOutcome::Authenticated { user, destination } => {
                    println!("Signed in as {} ({})", user.name, user.role);
                    let tabs: Vec<_> = destination.tabs().iter().map(|t| t.title).collect();
                    println!("{}", tabs.join(" | "));
                }
                LoginOutcome::Aborted => println!("Sign-in cancelled"),
            }
        }

        Commands::Register {
            name,
            email,
            role,
            password,
        } => {
            let identity = HttpIdentityProvider::new(&config.auth_url, config.timeout)?;
            let form = Registration {
                name,
                email,
                password: password_or_stdin(password)?,
                role,
            };
            let user = AuthFlow::new(&session, &identity).register(&form)?;
            println!("Welcome, {} ({})", user.name, user.role);
        }

        Commands::Logout => {
            let identity = HttpIdentityProvider::new(&config.auth_url, config.timeout)?;
            AuthFlow::new(&session, &identity).logout()?;
            println!("Signed out");
        }

        Commands::Whoami => {
            if !session.is_signed_in()? {
                println!("Not signed in");
                return Ok(());
            }
            let user = session.current_user()?;
            println!("{} <{}>", user.name, user.email);
            println!("Role: {}", user.role);
        }

        Commands::Doctors => {
            for doctor in booking::available_doctors(&session)? {
                let specialization = doctor.specialization.as_deref().unwrap_or("General");
                println!("{:<26} {:<28} {}", doctor.id, doctor.name, specialization);
            }
        }

        Commands::Appointments => {
            let role = session.current_user()?.role;
            let items = appointments::list(&session, role)?;
            if items.is_empty() {
                println!("No appointments");
            }
            for appt in &items {
                let row = AppointmentRow::new(appt, role);
                println!(
                    "{:<26} {:<12} {:<9} {:<10} {}",
                    row.id, row.date_label, row.time_label, row.status_label, row.counterpart
                );
            }
        }

        Commands::Show { id } => {
            let role = session.current_user()?.role;
            let detail = appointments::detail(&session, &id, role)?;
            let appt = &detail.appointment;
            println!("Appointment {}", appt.id);
            println!("  With:   {} ({})", detail.counterpart.name, detail.counterpart.role);
            if let Some(extra) = &detail.counterpart.detail {
                println!("          {extra}");
            }
            println!("  When:   {} at {}", format::format_date(&appt.date), format::format_time(&appt.time));
            println!("  Status: {}", format::status_label(appt.status));
            println!("  Reason: {}", appt.reason);
            if let Some(comment) = &appt.comment {
                println!("  Note:   {comment}");
            }
            let row = AppointmentRow::new(appt, role);
            if row.cancellable {
                println!("  Cancel with `careline cancel {}`", appt.id);
            } else if row.settled {
                println!("  No further changes");
            }
        }

        Commands::Book {
            doctor,
            date,
            time,
            reason,
        } => {
            let choice = find_doctor(&session, &doctor)?;
            let step = ReasonStep::new(BookingMode::New)
                .reason(&reason)?
                .choose(choice, &date, &TimeInput::Text(time))?;
            print_summary(&step.summary());
            if let BookingResult::Created(appt) = step.submit(&session)? {
                println!("Booked appointment {} ({})", appt.id, format::status_label(appt.status));
            }
        }

        Commands::Reschedule {
            id,
            doctor,
            date,
            time,
            reason,
        } => {
            let reason = match reason {
                Some(reason) => reason,
                None => {
                    let token = session.token()?;
                    session.api().appointment(&token, &id)?.reason
                }
            };
            let choice = find_doctor(&session, &doctor)?;
            let step = ReasonStep::new(BookingMode::Reschedule {
                appointment_id: id,
            })
            .reason(&reason)?
            .choose(choice, &date, &TimeInput::Text(time))?;
            print_summary(&step.summary());
            step.submit(&session)?;
            println!("Reschedule requested");
        }

        Commands::Cancel { id, yes } => {
            let outcome = if yes {
                appointments::cancel(&session, &id, &FixedAnswer(true))?
            } else {
                appointments::cancel(&session, &id, &StdinPrompt)?
            };
            match outcome {
                CancelOutcome::Requested => println!("Cancellation requested"),
                CancelOutcome::Dismissed => println!("Kept appointment"),
            }
        }

        Commands::Diagnosis { id, set, notes } => {
            let mut panel = DiagnosisPanel::load(&session, &id)?;
            if let Some(text) = set {
                let draft = DiagnosisDraft {
                    diagnosis: text,
                    notes,
                };
                panel.save(&session, &draft)?;
            }
            match panel.diagnosis() {
                Some(d) => {
                    println!("Diagnosis: {}", d.diagnosis);
                    if let Some(notes) = &d.notes {
                        println!("Notes:     {notes}");
                    }
                }
                None => println!("No diagnosis recorded"),
            }
        }

        Commands::Prescription(args) => {
            record_command::<Prescription>(&session, args, std::convert::identity)?
        }
        Commands::Certificate(args) => {
            record_command::<MedicalCertificate>(&session, args, std::convert::identity)?
        }
        Commands::Receipt(args) => {
            record_command::<Receipt>(&session, args, ReceiptDraft::with_total)?
        }
    }
    Ok(())
}

fn record_command<R>(
    session: &DefaultSession,
    args: RecordArgs,
    prepare: fn(R::Draft) -> R::Draft,
) -> Result<(), ClientError>
where
    R: ClinicalRecord + Serialize,
    R::Draft: DeserializeOwned,
{
    let mut panel = RecordPanel::<R>::load(session, &args.id)?;

    if let Some(path) = &args.save_json {
        let draft = prepare(read_json(path)?);
        panel.save(session, &draft)?;
        println!("Saved {}", R::LABEL);
    }
    if args.approve {
        match panel.approve(session)? {
            ApproveOutcome::Verified => println!("Approved {}", R::LABEL),
            ApproveOutcome::AlreadyVerified => println!("The {} is already approved", R::LABEL),
        }
    }

    match panel.record() {
        Some(record) => {
            let pretty = serde_json::to_string_pretty(record)
                .map_err(|e| ClientError::Validation(format!("Cannot display {}: {e}", R::LABEL)))?;
            println!("{pretty}");
        }
        None => println!("No {} for this appointment", R::LABEL),
    }
    Ok(())
}

fn find_doctor(session: &DefaultSession, id: &str) -> Result<DoctorChoice, ClientError> {
    booking::available_doctors(session)?
        .iter()
        .find(|d| d.id == id)
        .map(DoctorChoice::from)
        .ok_or_else(|| ClientError::Validation(format!("Unknown doctor {id:?}")))
}

fn print_summary(summary: &booking::BookingSummary) {
    let heading = if summary.rescheduling { "Rescheduling" } else { "Booking" };
    println!("{heading} with {}", summary.doctor_name);
    println!("  {} at {}", summary.date_label, summary.time_label);
    println!("  Reason: {}", summary.reason);
}

fn read_json<D: DeserializeOwned>(path: &Path) -> Result<D, ClientError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ClientError::Validation(format!("Cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| ClientError::Validation(format!("Invalid draft in {}: {e}", path.display())))
}

fn password_or_stdin(password: Option<String>) -> Result<String, ClientError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| ClientError::Validation(format!("Cannot read password: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
