pub mod builder;

mod store;
mod wizard;

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use builder::{apply_script, read_document, read_edit_script, write_document};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use hireflow_spec::{
    apply, build_preview_payload, first_invalid, render_json_ui, render_text, resolve_visibility,
    save, validate, AnswerMap, AnswerValue, Assessment, AssessmentStore, EditIntent, Question,
    QuestionPatch, QuestionType, ResponseDocument, RuntimeSession, SaveError, SessionError,
    SubmitOutcome, VisibilityPredicate,
};
use store::JsonFileStore;
use wizard::{FillPresenter, PromptContext, Verbosity};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Assessment authoring and filling CLI",
    long_about = "Authors per-job assessment documents, previews and validates them, and runs the respondent-facing filling wizard."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Interactively author the assessment for a job and save it.
    New {
        /// Job the assessment belongs to.
        #[arg(long, value_name = "JOB")]
        job_id: String,
        /// Data directory (defaults to HIREFLOW_DATA_DIR or the current directory).
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
        /// Replace an existing assessment for the job.
        #[arg(long)]
        force: bool,
        /// Print the saved document for debugging.
        #[arg(long)]
        verbose: bool,
    },
    /// Apply a JSON edit script to an assessment document.
    Apply {
        /// Path to the assessment document JSON.
        #[arg(long, value_name = "DOC")]
        assessment: PathBuf,
        /// Path to the edit script: a JSON array of edit operations.
        #[arg(long, value_name = "EDITS")]
        edits: PathBuf,
        /// Where to write the edited document (stdout when omitted).
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
        /// Confirm removal operations contained in the script.
        #[arg(long)]
        yes: bool,
    },
    /// Render a preview of an assessment document.
    Preview {
        /// Path to the assessment document JSON.
        #[arg(long, value_name = "DOC")]
        assessment: PathBuf,
        /// Optional JSON file with current answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Render output mode.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Validate answers against an assessment document.
    Validate {
        /// Path to the assessment document JSON.
        #[arg(long, value_name = "DOC")]
        assessment: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Fill the assessment for a job as a respondent and submit it.
    Fill {
        /// Job whose assessment should be filled.
        #[arg(long, value_name = "JOB")]
        job_id: String,
        /// Data directory (defaults to HIREFLOW_DATA_DIR or the current directory).
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
        /// Show verbose output (progress, visible questions, parse expectations).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also emit the response JSON after submission.
        #[arg(long)]
        response_json: bool,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::New {
            job_id,
            data_dir,
            force,
            verbose,
        } => run_new(job_id, data_dir, force, verbose),
        Command::Apply {
            assessment,
            edits,
            out,
            yes,
        } => run_apply(assessment, edits, out, yes),
        Command::Preview {
            assessment,
            answers,
            format,
        } => run_preview(assessment, answers, format),
        Command::Validate { assessment, answers } => run_validate(assessment, answers),
        Command::Fill {
            job_id,
            data_dir,
            verbose,
            response_json,
        } => run_fill(job_id, data_dir, verbose, response_json),
    }
}

fn run_new(
    job_id: String,
    data_dir: Option<PathBuf>,
    force: bool,
    verbose: bool,
) -> CliResult<()> {
    let store = JsonFileStore::new(resolve_data_root(data_dir)?);
    if store.load_assessment(&job_id)?.is_some() && !force {
        return Err(format!(
            "an assessment for job '{}' already exists; rerun with --force to replace it",
            job_id
        )
        .into());
    }

    println!("Interactive assessment builder for job '{}'", job_id);
    let mut assessment = Assessment::empty(&job_id, Utc::now());
    let mut section = 0usize;

    loop {
        let default_title = assessment.sections[section].title.clone();
        let title = prompt_line("Section title", Some(&default_title))?;
        if title != default_title {
            assessment = apply(
                &assessment,
                &EditIntent::RenameSection { section, title },
                Utc::now(),
            )?;
        }

        loop {
            let Some(label) = prompt_optional("Question label (blank to finish section)")? else {
                break;
            };
            let kind = prompt_question_type()?;
            assessment = apply(
                &assessment,
                &EditIntent::AddQuestion { section, kind },
                Utc::now(),
            )?;
            let question = assessment.sections[section].questions.len() - 1;
            let required = prompt_bool("Required?", false)?;

            let mut patch = QuestionPatch {
                label: Some(label),
                required: Some(required),
                ..Default::default()
            };

            match kind {
                QuestionType::Single | QuestionType::Multi => {
                    let current = assessment.sections[section].questions[question]
                        .choices
                        .clone()
                        .unwrap_or_default();
                    patch.choices = Some(prompt_choices(&current)?);
                }
                QuestionType::Number => {
                    patch.min = prompt_bound("Minimum numeric value", 0.0)?;
                    patch.max = prompt_bound("Maximum numeric value", 100.0)?;
                }
                QuestionType::Short => {
                    patch.max_length = prompt_length("Maximum length", 120)?;
                }
                QuestionType::Long => {
                    patch.max_length = prompt_length("Maximum length", 500)?;
                }
                QuestionType::File => {}
            }

            if prompt_bool("Visible only when another answer matches?", false)? {
                patch.visible_if = Some(Some(prompt_visibility_predicate(&assessment)?));
            }

            assessment = apply(
                &assessment,
                &EditIntent::UpdateQuestion {
                    section,
                    question,
                    patch,
                },
                Utc::now(),
            )?;
        }

        if !prompt_bool("Add another section?", false)? {
            break;
        }
        assessment = apply(&assessment, &EditIntent::AddSection, Utc::now())?;
        section = assessment.sections.len() - 1;
    }

    save_with_retry(&store, &assessment)?;
    println!(
        "Saved assessment for job '{}' ({} question(s))",
        assessment.job_id,
        assessment.question_count()
    );
    if verbose {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    }
    Ok(())
}

fn save_with_retry(store: &JsonFileStore, assessment: &Assessment) -> CliResult<()> {
    loop {
        match save(store, assessment) {
            Ok(()) => return Ok(()),
            Err(SaveError::Store(error)) => {
                eprintln!("Save failed: {}", error);
                if !prompt_bool("Retry save?", true)? {
                    return Err("assessment was not saved".into());
                }
            }
            Err(refusal) => return Err(refusal.to_string().into()),
        }
    }
}

fn run_apply(
    assessment_path: PathBuf,
    edits_path: PathBuf,
    out: Option<PathBuf>,
    yes: bool,
) -> CliResult<()> {
    let assessment = read_document(&assessment_path)?;
    let intents = read_edit_script(&edits_path)?;

    if !yes && intents.iter().any(EditIntent::requires_confirmation) {
        return Err(
            "edit script contains removal operations; rerun with --yes to confirm them".into(),
        );
    }

    let edited = apply_script(&assessment, &intents, Utc::now())?;
    match out {
        Some(path) => {
            write_document(&path, &edited)?;
            println!(
                "Applied {} edit(s); wrote {}",
                intents.len(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&edited)?),
    }
    Ok(())
}

fn run_preview(
    assessment_path: PathBuf,
    answers_path: Option<PathBuf>,
    format: RenderMode,
) -> CliResult<()> {
    let assessment = read_document(&assessment_path)?;
    let answers = read_answers(answers_path.as_deref())?;
    let payload = build_preview_payload(&assessment, &answers, &BTreeSet::new());

    match format {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json_ui(&payload))?
        ),
    }
    Ok(())
}

fn run_validate(assessment_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let assessment = read_document(&assessment_path)?;
    let answers = read_answers(Some(&answers_path))?;

    // A standalone validation run reports every field, so all questions
    // count as touched.
    let touched: BTreeSet<String> = assessment
        .questions()
        .map(|question| question.id.clone())
        .collect();
    let visibility = resolve_visibility(&assessment, &answers);
    let validation = validate(&assessment, &visibility, &answers, &touched);

    let invalid: Vec<&Question> = assessment
        .questions()
        .filter(|question| validation.get(&question.id).copied().unwrap_or(false))
        .collect();

    println!(
        "Validation result: {}",
        if invalid.is_empty() { "valid" } else { "invalid" }
    );
    for question in &invalid {
        println!("  {} - {}", question.id, question.label);
    }
    if let Some(first) = first_invalid(&assessment, &validation) {
        println!("First invalid question: {}", first);
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn run_fill(
    job_id: String,
    data_dir: Option<PathBuf>,
    verbose: bool,
    response_json: bool,
) -> CliResult<()> {
    let store = JsonFileStore::new(resolve_data_root(data_dir)?);
    let Some(mut session) = RuntimeSession::load(&store, &job_id)? else {
        return Err(format!("no assessment has been authored for job '{}'", job_id).into());
    };

    let mut presenter = FillPresenter::new(Verbosity::from_verbose(verbose), response_json);
    let mut skipped: BTreeSet<String> = BTreeSet::new();

    loop {
        let payload =
            build_preview_payload(session.assessment(), session.answers(), session.touched());
        presenter.show_header(&payload);

        let target = session
            .assessment()
            .questions()
            .find(|question| {
                session.is_visible(&question.id)
                    && !session.answers().contains_key(&question.id)
                    && !skipped.contains(&question.id)
            })
            .cloned();

        if let Some(question) = target {
            presenter.show_status(&payload);
            let prompt = PromptContext::new(&question, &payload.progress);
            match prompt_answer(&prompt, &question, &presenter)? {
                Some(value) => session.set_answer(&question.id, value)?,
                None => {
                    skipped.insert(question.id.clone());
                }
            }
            session.touch(&question.id)?;
            continue;
        }

        let now = Utc::now();
        match session.submit(&store, now) {
            Ok(SubmitOutcome::Submitted) => {
                let response = ResponseDocument {
                    values: session.answers().clone(),
                    submitted_at: now,
                };
                presenter.show_completion(&response);
                return Ok(());
            }
            Ok(SubmitOutcome::Rejected { first_invalid }) => {
                let question = session
                    .assessment()
                    .question(&first_invalid)
                    .cloned()
                    .ok_or_else(|| format!("unknown question '{}'", first_invalid))?;
                presenter.show_rejection(&question);
                let prompt = PromptContext::new(&question, &payload.progress);
                if let Some(value) = prompt_answer(&prompt, &question, &presenter)? {
                    session.set_answer(&question.id, value)?;
                }
                skipped.remove(&question.id);
            }
            Err(SessionError::Submit(error)) => {
                eprintln!("Submission failed: {}", error);
                if !prompt_bool("Retry submission?", true)? {
                    return Err("response was not submitted".into());
                }
            }
            Err(error) => return Err(error.to_string().into()),
        }
    }
}

fn prompt_answer(
    prompt: &PromptContext,
    question: &Question,
    presenter: &FillPresenter,
) -> CliResult<Option<AnswerValue>> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("filling aborted by user".into());
        }

        match wizard::parse_answer(question, trimmed) {
            Ok(value) => return Ok(value),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

fn read_answers(path: Option<&std::path::Path>) -> CliResult<AnswerMap> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(AnswerMap::new()),
    }
}

fn resolve_data_root(dir: Option<PathBuf>) -> CliResult<PathBuf> {
    let candidate = match dir {
        Some(path) => path,
        None => env::var_os("HIREFLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    if candidate.as_os_str().is_empty() {
        return Err("data directory cannot be empty".into());
    }
    Ok(candidate)
}

fn prompt_line(prompt: &str, default: Option<&str>) -> CliResult<String> {
    if let Some(default_value) = default {
        print!("{} [{}]: ", prompt, default_value);
    } else {
        print!("{}: ", prompt);
    }
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        if let Some(default_value) = default {
            Ok(default_value.to_string())
        } else {
            Ok(String::new())
        }
    } else {
        Ok(trimmed.to_string())
    }
}

fn prompt_optional(prompt: &str) -> CliResult<Option<String>> {
    let value = prompt_line(prompt, None)?;
    if value.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

fn prompt_non_empty(prompt: &str) -> CliResult<String> {
    loop {
        let value = prompt_line(prompt, None)?;
        if !value.trim().is_empty() {
            return Ok(value);
        }
        println!("Value cannot be empty.");
    }
}

fn prompt_bool(prompt: &str, default: bool) -> CliResult<bool> {
    let prompt_text = format!("{} (y/n)", prompt.trim());
    let default_hint = if default { "Y" } else { "N" };
    loop {
        let line = prompt_line(&prompt_text, Some(default_hint))?;
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            other => {
                println!("Invalid answer '{}'. Expected yes or no.", other);
            }
        }
    }
}

fn prompt_question_type() -> CliResult<QuestionType> {
    loop {
        let value = prompt_line(
            "Question type (single|multi|short|long|number|file)",
            Some("short"),
        )?;
        match parse_question_type(&value) {
            Ok(kind) => return Ok(kind),
            Err(err) => println!("{}", err),
        }
    }
}

fn parse_question_type(value: &str) -> Result<QuestionType, String> {
    match value.trim().to_lowercase().as_str() {
        "single" | "choice" => Ok(QuestionType::Single),
        "multi" | "multiple" => Ok(QuestionType::Multi),
        "short" | "text" => Ok(QuestionType::Short),
        "long" | "textarea" => Ok(QuestionType::Long),
        "number" | "numeric" => Ok(QuestionType::Number),
        "file" | "upload" => Ok(QuestionType::File),
        _ => Err(format!("unknown question type '{}'", value)),
    }
}

fn prompt_choices(current: &[String]) -> CliResult<Vec<String>> {
    loop {
        let raw = prompt_line("Comma separated choices", Some(&current.join(", ")))?;
        let normalized = raw
            .split(',')
            .map(str::trim)
            .filter(|choice| !choice.is_empty())
            .map(|choice| choice.to_string())
            .collect::<Vec<_>>();
        if normalized.is_empty() {
            println!("Provide at least one choice.");
            continue;
        }
        return Ok(normalized);
    }
}

// Blank keeps the type default already on the question; 'none' clears
// the bound; anything else must parse as a number.
fn prompt_bound(prompt: &str, current: f64) -> CliResult<Option<Option<f64>>> {
    loop {
        let raw = prompt_line(
            &format!("{} (blank keeps {}, 'none' clears)", prompt, current),
            None,
        )?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.eq_ignore_ascii_case("none") {
            return Ok(Some(None));
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(Some(Some(value))),
            _ => println!("Enter a number, 'none', or leave blank."),
        }
    }
}

fn prompt_length(prompt: &str, current: usize) -> CliResult<Option<Option<usize>>> {
    loop {
        let raw = prompt_line(
            &format!("{} (blank keeps {}, 'none' clears)", prompt, current),
            None,
        )?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.eq_ignore_ascii_case("none") {
            return Ok(Some(None));
        }
        match trimmed.parse::<usize>() {
            Ok(value) => return Ok(Some(Some(value))),
            Err(_) => println!("Enter a whole number, 'none', or leave blank."),
        }
    }
}

fn prompt_visibility_predicate(assessment: &Assessment) -> CliResult<VisibilityPredicate> {
    println!("Existing questions: {}", existing_question_ids(assessment));
    let mut predicate = VisibilityPredicate::new();
    loop {
        let Some(dependency) = prompt_optional("Dependency question ID (blank to finish)")? else {
            break;
        };
        let expected = prompt_non_empty("Expected answer value")?;
        predicate.insert(dependency, expected);
    }
    Ok(predicate)
}

fn existing_question_ids(assessment: &Assessment) -> String {
    let ids = assessment
        .questions()
        .map(|question| question.id.as_str())
        .collect::<Vec<_>>();
    if ids.is_empty() {
        "<none>".into()
    } else {
        ids.join(", ")
    }
}
