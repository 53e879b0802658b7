use chrono::Utc;
use clap::{Parser, Subcommand};
use dva_core::bundle::{inbound_notification, literal_bundle};
use dva_core::ResponseTemplate;
use fhir::{Bundle, FHIR_JSON_MIME};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dva")]
#[command(about = "DVA notification provider CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the literal five-entry response bundle
    Literal {
        /// Response identifier (optional)
        #[arg(long)]
        correlation_id: Option<String>,
    },
    /// Print the templated response for a correlation id
    Ack {
        /// Correlation id written to the message response
        correlation_id: String,
        /// Template file (default: the embedded template)
        #[arg(long)]
        template: Option<PathBuf>,
    },
    /// Print the sample inbound notification
    Inbound,
    /// Send the sample inbound notification to a running provider
    Notify {
        /// Provider endpoint, e.g. http://localhost:8080/Bundle
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Literal { correlation_id }) => {
            let bundle = literal_bundle(correlation_id.as_deref(), Utc::now());
            println!("{}", bundle.to_json_pretty()?);
        }
        Some(Commands::Ack {
            correlation_id,
            template,
        }) => {
            println!("{}", render_ack(&correlation_id, template.as_deref())?);
        }
        Some(Commands::Inbound) => {
            println!("{}", inbound_notification(Utc::now()).to_json_pretty()?);
        }
        Some(Commands::Notify { url }) => {
            let (bundle, correlation_id) =
                with_fresh_correlation_id(inbound_notification(Utc::now()));
            let response = reqwest::Client::new()
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, FHIR_JSON_MIME)
                .body(bundle.to_json()?)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body = accepted_body(status, body)?;
            println!("Sent notification with correlation id: {}", correlation_id);
            println!("{}", body);
        }
        None => {
            println!("Use 'dva --help' for commands");
        }
    }

    Ok(())
}

fn render_ack(correlation_id: &str, template: Option<&Path>) -> Result<String, Box<dyn Error>> {
    let bundle = ResponseTemplate::from_path(template)
        .try_build(correlation_id)
        .map_err(|e| format!("Error building response: {e}"))?;
    Ok(bundle.to_json_pretty()?)
}

/// The provider's acknowledgement, or an error when it did not answer 2xx.
fn accepted_body(status: reqwest::StatusCode, body: String) -> Result<String, Box<dyn Error>> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(format!("Provider answered {status}: {body}").into())
    }
}

/// Give the message header a new UUID so each notification gets its own delayed response.
fn with_fresh_correlation_id(mut bundle: Bundle) -> (Bundle, String) {
    let id = uuid::Uuid::new_v4().to_string();
    if let Some(header) = bundle.message_header_mut() {
        header.id = Some(id.clone());
    }
    if let Some(entry) = bundle.entry.first_mut() {
        entry.full_url = Some(fhir::urn_uuid(&id));
    }
    (bundle, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_correlation_id_becomes_first_entry_identity() {
        let (bundle, id) = with_fresh_correlation_id(inbound_notification(Utc::now()));

        let first = bundle.first_entry().expect("header entry");
        assert_eq!(first.identity(), Some(id.as_str()));
        assert_eq!(first.full_url.as_deref(), Some(fhir::urn_uuid(&id).as_str()));
        assert_ne!(id, dva_core::bundle::fixtures::MESSAGE_HEADER_ID);
    }

    #[test]
    fn cli_parses_ack_with_template() {
        let cli = Cli::try_parse_from(["dva", "ack", "abc", "--template", "/tmp/t.json"])
            .expect("parse args");
        match cli.command {
            Some(Commands::Ack {
                correlation_id,
                template,
            }) => {
                assert_eq!(correlation_id, "abc");
                assert_eq!(template, Some(PathBuf::from("/tmp/t.json")));
            }
            _ => panic!("expected ack command"),
        }
    }

    #[test]
    fn ack_with_unreadable_template_is_an_error() {
        let err = render_ack("abc", Some(Path::new("/nonexistent/dva/response.json")))
            .expect_err("template file does not exist");
        assert!(err.to_string().starts_with("Error building response"));
    }

    #[test]
    fn ack_with_embedded_template_renders_the_correlation_id() {
        let json = render_ack("abc", None).expect("embedded template builds");
        assert!(json.contains("\"identifier\": \"abc\""));
    }

    #[test]
    fn provider_error_status_fails_notify() {
        let err = accepted_body(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
        )
        .expect_err("5xx is a failure");
        assert_eq!(
            err.to_string(),
            "Provider answered 500 Internal Server Error: boom"
        );

        let body = accepted_body(reqwest::StatusCode::OK, "ack".to_string()).expect("2xx");
        assert_eq!(body, "ack");
    }
}
