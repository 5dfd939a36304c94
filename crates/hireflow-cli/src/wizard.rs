use std::fmt::Write;

use hireflow_spec::{
    AnswerValue, PreviewPayload, PreviewProgress, Question, QuestionType, ResponseDocument,
};

/// Controls which bits of state the filling wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: progress, visible questions, parse expectations.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and status once the session yields the next question.
pub struct FillPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_response_json: bool,
}

impl FillPresenter {
    pub fn new(verbosity: Verbosity, show_response_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_response_json,
        }
    }

    pub fn show_header(&mut self, payload: &PreviewPayload) {
        if self.header_printed {
            return;
        }
        println!("Assessment for job: {}", payload.job_id);
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &PreviewPayload) {
        if !self.verbosity.is_verbose() {
            return;
        }
        println!(
            "Progress: {}/{} visible questions answered",
            payload.progress.answered, payload.progress.total
        );
        println!("Visible questions:");
        for section in &payload.sections {
            for question in section.questions.iter().filter(|question| question.visible) {
                let mut entry = format!(" - {} ({})", question.id, question.label);
                if question.required {
                    entry.push_str(" [required]");
                }
                println!("{}", entry);
            }
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = if prompt.total > 0 {
            format!("{}/{} {}", prompt.index, prompt.total, prompt.label)
        } else {
            format!("{} {}", prompt.index, prompt.label)
        };
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if self.verbosity.is_verbose() && !prompt.choices.is_empty() {
            println!("Choices: {}", prompt.choices.join(", "));
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_rejection(&self, question: &Question) {
        println!(
            "'{}' needs attention before the assessment can be submitted.",
            question.label
        );
    }

    pub fn show_completion(&self, response: &ResponseDocument) {
        println!("Submitted ✅");
        match response.to_cbor() {
            Ok(bytes) => {
                println!("Response (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize response to CBOR: {}", err);
            }
        }
        if self.show_response_json {
            match response.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize response to JSON: {}", err);
                }
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub required: bool,
    pub hint: Option<String>,
    pub choices: Vec<String>,
}

impl PromptContext {
    pub fn new(question: &Question, progress: &PreviewProgress) -> Self {
        let choices = question.choices.clone().unwrap_or_default();
        let hint = hint_for(question, &choices);
        Self {
            index: (progress.answered + 1).max(1),
            total: progress.total,
            label: question.label.clone(),
            required: question.required,
            hint,
            choices,
        }
    }
}

fn hint_for(question: &Question, choices: &[String]) -> Option<String> {
    match question.kind {
        QuestionType::Single if !choices.is_empty() => Some(format!("({})", choices.join("/"))),
        QuestionType::Multi if !choices.is_empty() => {
            Some(format!("(comma separated: {})", choices.join("/")))
        }
        QuestionType::Number => match (question.min, question.max) {
            (Some(min), Some(max)) => Some(format!("(number {min}..{max})")),
            _ => Some("(number)".to_string()),
        },
        QuestionType::File => Some("(file name)".to_string()),
        _ => None,
    }
}

/// Error produced when parsing an answer typed by the respondent.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Parses raw terminal input into an answer value for the question.
/// `Ok(None)` means the respondent skipped an optional question.
pub fn parse_answer(
    question: &Question,
    raw: &str,
) -> Result<Option<AnswerValue>, AnswerParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        if question.required {
            return Err(AnswerParseError::new(
                "This question requires an answer.",
                None,
            ));
        }
        return Ok(None);
    }

    match question.kind {
        QuestionType::Single => parse_single(question, trimmed).map(Some),
        QuestionType::Multi => parse_multi(question, trimmed).map(Some),
        QuestionType::Number => parse_number(trimmed).map(Some),
        QuestionType::Short | QuestionType::Long | QuestionType::File => {
            Ok(Some(AnswerValue::text(trimmed)))
        }
    }
}

fn parse_single(question: &Question, raw: &str) -> Result<AnswerValue, AnswerParseError> {
    let choices = question.choices.as_deref().unwrap_or_default();
    match_choice(choices, raw).map(AnswerValue::text)
}

fn parse_multi(question: &Question, raw: &str) -> Result<AnswerValue, AnswerParseError> {
    let choices = question.choices.as_deref().unwrap_or_default();
    let mut selected = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let canonical = match_choice(choices, part)?;
        if !selected.contains(&canonical) {
            selected.push(canonical);
        }
    }
    Ok(AnswerValue::Selections(selected))
}

fn match_choice(choices: &[String], raw: &str) -> Result<String, AnswerParseError> {
    if let Some(choice) = choices
        .iter()
        .find(|choice| choice.eq_ignore_ascii_case(raw))
    {
        Ok(choice.clone())
    } else {
        Err(AnswerParseError::new(
            format!("Choose one of: {}.", choices.join(", ")),
            Some(format!("allowed values: {}", choices.join(", "))),
        ))
    }
}

fn parse_number(raw: &str) -> Result<AnswerValue, AnswerParseError> {
    match raw.parse::<f64>() {
        // Numeric answers stay string-encoded on the wire; range checks
        // run in the validation evaluator at submit time.
        Ok(value) if value.is_finite() => Ok(AnswerValue::text(raw)),
        _ => Err(AnswerParseError::new(
            "Please enter a number.",
            Some("expected a finite number".to_string()),
        )),
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
