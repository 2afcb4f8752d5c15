use std::sync::Arc;

use jstables_types::DataChunk;
use parking_lot::Mutex;

use crate::err::Error;
use crate::host::{BindResult, GlobalState, TableFunction, TableFunctionBindInput};
use crate::rt::Runtime;
use crate::scan::{ScanRequest, ScanState, ScanStatus};

/// The `js_table` table function, which scans the rows a JavaScript function yields.
pub struct JsTableFunction {
	runtime: Arc<Runtime>,
}

impl JsTableFunction {
	pub const NAME: &'static str = "js_table";

	pub fn new(runtime: Arc<Runtime>) -> Self {
		JsTableFunction {
			runtime,
		}
	}
}

/// The scan of one bound call.
#[derive(Debug)]
pub struct TableBindData {
	scan: Mutex<ScanState>,
}

impl TableBindData {
	pub fn status(&self) -> ScanStatus {
		self.scan.lock().status()
	}
}

#[derive(Debug)]
pub struct TableGlobalState;

impl GlobalState for TableGlobalState {
	fn max_threads(&self) -> usize {
		// The row iterator has a single consumer
		1
	}
}

#[derive(Debug, Default)]
pub struct TableLocalState {
	done: bool,
}

impl TableFunction for JsTableFunction {
	type BindData = TableBindData;
	type GlobalState = TableGlobalState;
	type LocalState = TableLocalState;

	fn name(&self) -> &str {
		Self::NAME
	}

	fn bind(&self, input: &TableFunctionBindInput) -> Result<BindResult<TableBindData>, Error> {
		let request = ScanRequest::from_input(input)?;
		let mut scan = ScanState::new(self.runtime.clone());
		let schema = scan.bind(&request)?.clone();
		Ok(BindResult {
			schema,
			data: TableBindData {
				scan: Mutex::new(scan),
			},
		})
	}

	fn init_global(&self, _: &TableBindData) -> Result<TableGlobalState, Error> {
		Ok(TableGlobalState)
	}

	fn init_local(&self, _: &TableBindData, _: &TableGlobalState) -> Result<TableLocalState, Error> {
		Ok(TableLocalState::default())
	}

	fn scan(
		&self,
		data: &TableBindData,
		local: &mut TableLocalState,
		output: &mut DataChunk,
	) -> Result<(), Error> {
		if local.done {
			output.reset();
			return Ok(());
		}
		let result = data.scan.lock().scan(output);
		local.done = result.is_err() || output.is_empty();
		result
	}
}
