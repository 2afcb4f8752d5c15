use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::validator::parser::tracing::CustomFilter;

/// The crates whose targets a plain log level applies to
const TARGETS: [&str; 2] = ["jstables", "jstables_core"];

#[derive(Default, Debug, Clone)]
pub struct Builder {
	filter: Option<CustomFilter>,
}

pub fn builder() -> Builder {
	Builder::default()
}

impl Builder {
	/// Set the log level on the builder
	pub fn with_log_level(mut self, log_level: &str) -> Self {
		if let Ok(filter) = filter_from_value(log_level) {
			self.filter = Some(CustomFilter {
				env: filter,
			});
		}
		self
	}

	/// Set the filter on the builder
	pub fn with_filter(mut self, filter: CustomFilter) -> Self {
		self.filter = Some(filter);
		self
	}

	/// Build a tracing dispatcher with a compact fmt layer writing to stderr
	pub fn build(self) -> Box<dyn Subscriber + Send + Sync + 'static> {
		let filter = self.filter.map(|f| f.env()).unwrap_or_else(|| EnvFilter::new("error"));
		let layer = tracing_subscriber::fmt::layer()
			.compact()
			.with_ansi(false)
			.with_target(true)
			.with_span_events(FmtSpan::NONE)
			.with_writer(std::io::stderr)
			.with_filter(filter);
		Box::new(tracing_subscriber::registry().with(layer))
	}

	/// Install the subscriber globally
	pub fn init(self) {
		self.build().init()
	}
}

/// Parses a log level or a full filter directive.
///
/// `none` disables logging, `full` traces everything, and a plain level
/// applies to this program's own targets with errors logged elsewhere.
pub fn filter_from_value(v: &str) -> Result<EnvFilter, ParseError> {
	match v {
		// Don't show any logs at all
		"none" => Ok(EnvFilter::default()),
		// Otherwise, let's show all traces
		"full" => Ok(EnvFilter::default().add_directive("trace".parse()?)),
		// Otherwise, let's only show errors
		"error" => Ok(EnvFilter::default().add_directive("error".parse()?)),
		// Specify the log level for each of our own crates
		"warn" | "info" | "debug" | "trace" => {
			let mut filter = EnvFilter::default().add_directive("error".parse()?);
			for target in TARGETS {
				filter = filter.add_directive(format!("{target}={v}").parse()?);
			}
			Ok(filter)
		}
		// Let's try to parse the custom log level
		_ => EnvFilter::builder().parse(v),
	}
}
