use std::sync::Arc;

use jstables_types::{DataChunk, LogicalType, Value};

use super::binding::{Bound, FunctionBinding, Specifier};
use crate::conv::{from_foreign, to_foreign};
use crate::err::Error;
use crate::host::{ScalarFunction, ScalarFunctionBindInput};
use crate::rt::Runtime;

const TARGET: &str = "jstables::core::fnc";

/// The `js_udf` scalar function, which calls a JavaScript function once per row.
pub struct JsScalarFunction {
	runtime: Arc<Runtime>,
}

impl JsScalarFunction {
	pub const NAME: &'static str = "js_udf";

	pub fn new(runtime: Arc<Runtime>) -> Self {
		JsScalarFunction {
			runtime,
		}
	}
}

/// The function resolved at bind time and the type its results are read as.
#[derive(Debug)]
pub struct ScalarBindData {
	binding: FunctionBinding,
	return_type: LogicalType,
}

impl ScalarBindData {
	pub fn binding(&self) -> &FunctionBinding {
		&self.binding
	}

	pub fn return_type(&self) -> &LogicalType {
		&self.return_type
	}
}

impl ScalarFunction for JsScalarFunction {
	type BindData = ScalarBindData;

	fn name(&self) -> &str {
		Self::NAME
	}

	fn bind(&self, input: &ScalarFunctionBindInput) -> Result<ScalarBindData, Error> {
		if let Some(name) = input.named_parameters.keys().find(|n| !matches!(n.as_str(), "module" | "func")) {
			return Err(Error::InvalidArgument {
				name: name.clone(),
				message: "unknown parameter, expected one of module, func".to_owned(),
			});
		}
		let (specifier, _) = Specifier::from_parameters(
			input.named_parameters.get("module"),
			input.named_parameters.get("func"),
			input.specifier.as_ref(),
		)?;
		// Scalar functions are called as exported
		let binding = self.runtime.with(|ctx| {
			Bound::resolve(&ctx, &specifier).map(|bound| bound.store(&self.runtime, &ctx))
		})?;
		debug!(target: TARGET, function = %specifier, returns = %input.return_type, "Bound scalar function");
		Ok(ScalarBindData {
			binding,
			return_type: input.return_type.clone(),
		})
	}

	fn execute(&self, data: &ScalarBindData, input: &DataChunk) -> Result<Vec<Value>, Error> {
		trace!(target: TARGET, function = %data.binding.specifier(), rows = input.size(), "Calling scalar function");
		self.runtime.with(|ctx| {
			let bound = data.binding.restore(&ctx)?;
			let mut output = Vec::with_capacity(input.size());
			for row in input.rows() {
				let args = row
					.iter()
					.zip(input.types())
					.map(|(value, kind)| to_foreign(&ctx, value, kind))
					.collect::<Result<Vec<_>, _>>()?;
				let result = bound.active().call(&args)?;
				output.push(from_foreign(&result, &data.return_type)?);
			}
			Ok(output)
		})
	}
}
