//! Course registration endpoint: form POSTs with positive and negative inputs.
//!
//! An accepted registration answers 200 with a JSON echo of the submitted form; a rejected
//! one answers 500.

use super::ApiError;
use crate::config::SitecheckConfig;
use crate::report::{CheckOutcome, ScenarioReport, Severity};
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

pub const SUITE: &str = "registration";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonKind {
    /// Natural person, registers with an address.
    Natural,
    /// Company, registers with an IČO.
    Company,
}

impl PersonKind {
    pub fn code(&self) -> &'static str {
        match self {
            PersonKind::Natural => "fyz",
            PersonKind::Company => "pra",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub targetid: String,
    pub kurz: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub person: PersonKind,
    pub address: String,
    pub ico: String,
    pub count: String,
    pub comment: String,
    pub souhlas: String,
}

impl Registration {
    /// A valid registration of a natural person.
    pub fn natural() -> Self {
        Self {
            targetid: "1".into(),
            kurz: "2".into(),
            name: "Jan".into(),
            surname: "Novák".into(),
            email: "jan.novak@abc.cz".into(),
            phone: "608123123".into(),
            person: PersonKind::Natural,
            address: "Brno".into(),
            ico: "27232433".into(),
            count: "1".into(),
            comment: "ahoj".into(),
            souhlas: "True".into(),
        }
    }

    pub fn company() -> Self {
        Self {
            person: PersonKind::Company,
            ..Self::natural()
        }
    }

    /// Form payload. `address` is only sent for natural persons, `ico` only for companies.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("targetid", self.targetid.as_str()),
            ("kurz", self.kurz.as_str()),
            ("name", self.name.as_str()),
            ("surname", self.surname.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("person", self.person.code()),
            ("count", self.count.as_str()),
            ("comment", self.comment.as_str()),
            ("souhlas", self.souhlas.as_str()),
        ];
        match self.person {
            PersonKind::Natural => fields.push(("address", self.address.as_str())),
            PersonKind::Company => fields.push(("ico", self.ico.as_str())),
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedStatus {
    Accepted,
    Rejected,
}

impl ExpectedStatus {
    pub fn code(&self) -> u16 {
        match self {
            ExpectedStatus::Accepted => 200,
            ExpectedStatus::Rejected => 500,
        }
    }
}

impl fmt::Display for ExpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationCase {
    pub name: &'static str,
    pub registration: Registration,
    pub expected: ExpectedStatus,
}

#[derive(Debug, Clone)]
pub struct RegistrationResponse {
    pub status: u16,
    pub body: String,
}

pub async fn submit(
    http: &reqwest::Client,
    url: &str,
    registration: &Registration,
) -> Result<RegistrationResponse, ApiError> {
    let response = http
        .post(url)
        .form(&registration.form_fields())
        .send()
        .await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(RegistrationResponse { status, body })
}

/// Warning for a status on the wrong side of accepted/rejected.
pub fn alert(expected: ExpectedStatus, actual: u16) -> Option<String> {
    match (expected, actual) {
        (ExpectedStatus::Rejected, 200) => {
            Some("Expected failure (500), but received 200 OK".to_string())
        }
        (ExpectedStatus::Accepted, 500) => {
            Some("Expected success (200), but received 500".to_string())
        }
        _ => None,
    }
}

/// Shorten long values so reasons stay readable.
fn clip(text: &str) -> String {
    const MAX: usize = 60;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}... ({} bytes)", &text[..cut], text.len()),
        None => text.to_string(),
    }
}

/// Scalar JSON value as text; numbers and strings compare alike.
fn echoed(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn echo_check(body: &Value, key: &str, sent: &str) -> (String, CheckOutcome) {
    let actual = echoed(body, key);
    let outcome = CheckOutcome::check(actual.as_deref() == Some(sent), || {
        format!(
            "{} echoed as {}, sent {:?}",
            key,
            actual
                .as_deref()
                .map(|a| format!("{:?}", clip(a)))
                .unwrap_or_else(|| "nothing".into()),
            clip(sent)
        )
    });
    (format!("echoes {}", key), outcome)
}

fn absent_check(body: &Value, key: &str) -> (String, CheckOutcome) {
    let actual = echoed(body, key).unwrap_or_default();
    let outcome = CheckOutcome::check(actual.is_empty(), || {
        format!("{} should be absent or empty, got {:?}", key, clip(&actual))
    });
    (format!("{} absent", key), outcome)
}

/// All checks for one response: the status, and for accepted cases the JSON echo.
pub fn verify(
    registration: &Registration,
    expected: ExpectedStatus,
    response: &RegistrationResponse,
) -> Vec<(String, CheckOutcome)> {
    let mut checks = vec![(
        format!("status {}", expected),
        CheckOutcome::check(response.status == expected.code(), || {
            format!(
                "Status code mismatch: expected {}, actual {}, response {:?}",
                expected,
                response.status,
                clip(&response.body)
            )
        }),
    )];
    if expected != ExpectedStatus::Accepted || response.status != expected.code() {
        return checks;
    }

    let body: Value = match serde_json::from_str(&response.body) {
        Ok(body) => body,
        Err(e) => {
            checks.push((
                "body is JSON".to_string(),
                CheckOutcome::fail(format!(
                    "Expected valid JSON in 200 response ({}): {:?}",
                    e,
                    clip(&response.body)
                )),
            ));
            return checks;
        }
    };
    checks.push(("body is JSON".to_string(), CheckOutcome::Pass));
    checks.push(echo_check(&body, "response", "200"));

    for (key, sent) in registration.form_fields() {
        if key == "targetid" {
            continue;
        }
        checks.push(echo_check(&body, key, sent));
    }
    checks.push(match registration.person {
        PersonKind::Natural => absent_check(&body, "ico"),
        PersonKind::Company => absent_check(&body, "address"),
    });
    checks
}

fn case(
    name: &'static str,
    expected: ExpectedStatus,
    base: Registration,
    edit: impl FnOnce(&mut Registration),
) -> RegistrationCase {
    let mut registration = base;
    edit(&mut registration);
    RegistrationCase {
        name,
        registration,
        expected,
    }
}

/// Natural person with the "Jan Novák, Brno" data and the given email, phone and comment.
fn natural_with(email: &str, phone: &str, ico: &str, comment: &str) -> Registration {
    Registration {
        email: email.into(),
        phone: phone.into(),
        ico: ico.into(),
        comment: comment.into(),
        ..Registration::natural()
    }
}

fn invalid_natural(comment: &str) -> Registration {
    natural_with("invalid@example.cz", "777123456", "12345678", comment)
}

fn named(name: &str, surname: &str, email: &str, address: &str, ico: &str, comment: &str) -> Registration {
    Registration {
        name: name.into(),
        surname: surname.into(),
        address: address.into(),
        ..natural_with(email, "777123456", ico, comment)
    }
}

/// Every registration case, positive cases first.
pub fn cases() -> Vec<RegistrationCase> {
    use ExpectedStatus::{Accepted, Rejected};

    let mut cases = vec![
        case("natural person", Accepted, Registration::natural(), |_| {}),
        case("company", Accepted, Registration::company(), |_| {}),
        case("long comment", Accepted, Registration::natural(), |r| {
            r.comment = "ahoj".repeat(1_000_000)
        }),
        case("minimal input", Accepted, Registration::natural(), |r| {
            r.name = "A".into();
            r.surname = "B".into();
            r.email = "a@b.cz".into();
            r.phone = "111222333".into();
            r.address = "Praha".into();
            r.ico = "00000000".into();
            r.comment = String::new();
        }),
        case("long name", Accepted, Registration::natural(), |r| {
            r.name = "Jan".repeat(20);
            r.surname = "Novák".repeat(20);
            r.email = "long.name@example.com".into();
            r.phone = "777888999".into();
            r.comment = "Test dlouhého jména".into();
        }),
        case("different course", Accepted, Registration::natural(), |r| {
            r.kurz = "3".into();
            r.name = "Lucie".into();
            r.surname = "Krásná".into();
            r.email = "lucie@example.cz".into();
            r.phone = "777123456".into();
            r.address = "Olomouc".into();
            r.ico = "11112222".into();
            r.count = "3".into();
            r.comment = "Zájem o kurz číslo 5".into();
        }),
        case("phone with +420", Accepted, Registration::natural(), |r| {
            r.name = "Eva".into();
            r.surname = "Mezinárodní".into();
            r.email = "eva@example.cz".into();
            r.phone = "+420777123456".into();
            r.comment = "Valid +420 phone".into();
        }),
    ];

    let international = [
        ("name with diacritics", "Šárka", "Černá", "sarka@example.cz", "Brno", "27232433", "Diacritics test"),
        ("name with hyphen", "Anna-Marie", "Nováková", "anna@example.cz", "Praha", "12345678", "Hyphen name"),
        ("name with accents", "José", "García", "jose@example.cz", "Brno", "27232433", "Accents in name"),
        ("name with umlauts", "Müller", "Schröder", "muller@example.cz", "Ostrava", "87654321", "German umlauts"),
        ("name with french characters", "Émilie", "Dùpont", "emilie@example.cz", "Plzeň", "12345678", "French characters"),
        ("name with nordic letters", "Åsa", "Jönsson", "asa@example.cz", "Brno", "87654321", "Nordic characters"),
        ("name in cyrillic", "Алексей", "Иванов", "aleksey@example.cz", "Brno", "87654321", "Cyrillic name"),
        ("name in greek", "Αλέξανδρος", "Παπαδόπουλος", "alex@example.cz", "Brno", "87654321", "Greek name"),
        ("name in japanese", "太郎", "山田", "taro@example.cz", "Brno", "87654321", "Japanese characters"),
        ("name with digits", "J4n", "Novák", "invalid@example.cz", "Brno", "12345678", "Digits in name"),
        ("name with symbols", "J@n!", "Novák", "invalid@example.cz", "Brno", "12345678", "Symbols in name"),
        ("surname with digits", "Jan", "Nov4k", "invalid@example.cz", "Brno", "12345678", "Digits in surname"),
        ("surname with symbols", "Jan", "N0v@k!", "invalid@example.cz", "Brno", "12345678", "Symbols in surname"),
        (
            "surname with encoded script",
            "Jan",
            "%3Cscript%3Ealert%28%22XSS%22%29%3C%2Fscript%3E",
            "invalid@example.cz",
            "Brno",
            "12345678",
            "Encoded script in surname",
        ),
        ("surname of spaces", "Jan", "     ", "invalid@example.cz", "Brno", "12345678", "Spaces only in surname"),
    ];
    for (label, name, surname, email, address, ico, comment) in international {
        cases.push(RegistrationCase {
            name: label,
            registration: named(name, surname, email, address, ico, comment),
            expected: Accepted,
        });
    }

    cases.push(case("very long surname", Accepted, invalid_natural("Too long surname"), |r| {
        r.surname = "Novák".repeat(100)
    }));
    for (label, count, comment) in [
        ("count 1", "1", "Count is 1"),
        ("count 5", "5", "Count is 5"),
        ("count 999", "999", "Count is 999"),
    ] {
        cases.push(case(label, Accepted, invalid_natural(comment), |r| {
            r.email = "valid@example.cz".into();
            r.count = count.into();
        }));
    }

    // Rejected: names and surnames
    cases.extend([
        case("script in name", Rejected, invalid_natural("Script in name"), |r| {
            r.name = "<script>alert('XSS')</script>".into()
        }),
        case("empty name", Rejected, invalid_natural("Empty name"), |r| r.name = String::new()),
        case("script in surname", Rejected, invalid_natural("Script in surname"), |r| {
            r.surname = "<script>alert('XSS')</script>".into()
        }),
        case("empty surname", Rejected, invalid_natural("Empty surname"), |r| {
            r.surname = String::new()
        }),
    ]);

    // Rejected: IČO
    for (label, ico) in [
        ("ico with 7 digits", "2723243"),
        ("ico too short", "1234567"),
        ("ico too long", "123456789"),
        ("ico with letters", "12A45678"),
        ("ico with special characters", "12-45678"),
        ("ico of zeroes", "00000000"),
        ("empty ico", ""),
    ] {
        cases.push(case(label, Rejected, Registration::company(), |r| r.ico = ico.into()));
    }

    // Rejected: e-mail
    for (label, email) in [
        ("email x@.cz", "x@.cz"),
        ("email @e.cz", "@e.cz"),
        ("email x@e.", "x@e."),
        ("email x@xcz", "x@xcz"),
        ("email with spaces before @", "x    @x.cz"),
        ("email with space before dot", "x@x .cz"),
        ("email with spaces before dot", "x@x     .cz"),
        ("email with emoji", "🦄@e.cz"),
        ("email with script", "<script>alert(\"Hello!\");</script>@example.com"),
        (
            "email with encoded script",
            "text=%3Cscript%3Ealert%28%22Hello%21%22%29%3B%3C%2Fscript%3E%40example.com",
        ),
    ] {
        cases.push(case(label, Rejected, Registration::company(), |r| r.email = email.into()));
    }
    cases.push(case("empty email", Rejected, Registration::natural(), |r| {
        r.email = String::new();
        r.comment = "Empty email".into();
    }));

    // Rejected: phone
    for (label, phone, comment) in [
        ("phone of 12 digits", "420777123456", "Too long phone"),
        ("phone starting with 0", "0777123456", "Starts with 0"),
        ("phone of 8 digits", "77712345", "Too short phone"),
        ("phone of 10 digits", "7771234567", "10-digit phone"),
        ("phone with letter", "777a23456", "Contains letter"),
        ("phone with special character", "777123@56", "Special char in phone"),
        ("empty phone", "", "Empty phone"),
    ] {
        cases.push(case(label, Rejected, Registration::natural(), |r| {
            r.phone = phone.into();
            r.comment = comment.into();
        }));
    }

    // Rejected: count
    for (label, count, comment) in [
        ("count 0", "0", "Zero count"),
        ("negative count", "-1", "Negative count"),
        ("decimal count", "2.5", "Decimal count"),
        ("count as text", "two", "Text in count"),
        ("empty count", "", "Empty count"),
    ] {
        cases.push(case(label, Rejected, invalid_natural(comment), |r| r.count = count.into()));
    }

    cases
}

async fn run_case(http: &reqwest::Client, url: &str, case: &RegistrationCase) -> ScenarioReport {
    let mut report = ScenarioReport::new(SUITE, case.name);
    let result = async {
        let response = submit(http, url, &case.registration).await?;
        info!("{}: status {}", case.name, response.status);
        if let Some(message) = alert(case.expected, response.status) {
            warn!(
                "ALERT {}: {} (response {:?})",
                case.name,
                message,
                clip(&response.body)
            );
            report.note(format!("ALERT: {}", message));
        }
        for (label, outcome) in verify(&case.registration, case.expected, &response) {
            report.record(label, Severity::Hard, outcome);
        }
        Ok::<(), ApiError>(())
    }
    .await;
    report.finish(result)
}

pub async fn run_suite(http: &reqwest::Client, config: &SitecheckConfig) -> Vec<ScenarioReport> {
    let url = &config.sites.registration;
    let mut reports = Vec::new();
    for case in cases() {
        reports.push(run_case(http, url, &case).await);
    }
    reports
}
