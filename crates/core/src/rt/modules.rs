use std::path::{Path, PathBuf};

use js::Ctx;
use js::loader::{BuiltinLoader, BuiltinResolver, Resolver, ScriptLoader};

use super::config::RuntimeConfig;

/// The source of the builtin companion module, which provides the schema decorator.
const COMPANION_SOURCE: &str = include_str!("jstables.js");

/// The file extensions of modules on disk, in lookup order
const EXTENSIONS: [&str; 2] = ["js", "mjs"];

/// Resolves in-memory modules first, then files in the module search path.
pub(super) fn resolver(config: &RuntimeConfig) -> (BuiltinResolver, PathResolver) {
	let mut builtin = BuiltinResolver::default();
	for name in builtins(config).map(|(name, _)| name) {
		builtin = builtin.with_module(name);
	}
	(builtin, PathResolver::new(config.module_paths.clone()))
}

pub(super) fn loader(config: &RuntimeConfig) -> (BuiltinLoader, ScriptLoader) {
	let mut builtin = BuiltinLoader::default();
	for (name, source) in builtins(config) {
		builtin = builtin.with_module(name, source);
	}
	(builtin, ScriptLoader::default().with_extension("mjs"))
}

/// Finds module files in a list of directories.
///
/// Bare names are looked up in each directory in turn, `./` and `../` names
/// next to the importing file. The resolved name is the absolute file path.
pub(super) struct PathResolver {
	paths: Vec<PathBuf>,
}

impl PathResolver {
	pub(super) fn new(paths: Vec<PathBuf>) -> Self {
		PathResolver {
			paths,
		}
	}

	fn find(&self, base: &str, name: &str) -> Option<PathBuf> {
		if name.starts_with("./") || name.starts_with("../") {
			let dir = Path::new(base).parent().filter(|dir| dir.is_absolute())?;
			return candidates(dir.join(name)).find(|file| file.is_file());
		}
		self.paths.iter().flat_map(|dir| candidates(dir.join(name))).find(|file| file.is_file())
	}
}

impl Resolver for PathResolver {
	fn resolve<'js>(&mut self, _ctx: &Ctx<'js>, base: &str, name: &str) -> js::Result<String> {
		let file = self.find(base, name).ok_or_else(|| js::Error::new_resolving(base, name))?;
		let file = std::path::absolute(&file).unwrap_or(file);
		Ok(file.to_string_lossy().into_owned())
	}
}

/// The files a module name may refer to: the name itself when it carries a
/// module extension, then the name with each extension appended.
fn candidates(path: PathBuf) -> impl Iterator<Item = PathBuf> {
	let explicit = path
		.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| EXTENSIONS.contains(&ext))
		.then(|| path.clone());
	let appended = EXTENSIONS.iter().map(move |ext| {
		let mut file = path.clone().into_os_string();
		file.push(".");
		file.push(ext);
		PathBuf::from(file)
	});
	explicit.into_iter().chain(appended)
}

/// The in-memory modules of a runtime. A user module named like the
/// decorator module replaces the builtin companion.
fn builtins(config: &RuntimeConfig) -> impl Iterator<Item = (&str, &str)> {
	let companion = config
		.decorator
		.as_ref()
		.filter(|d| config.companion && !config.modules.contains_key(&d.module))
		.map(|d| (d.module.as_str(), COMPANION_SOURCE));
	config.modules.iter().map(|(name, source)| (name.as_str(), source.as_str())).chain(companion)
}
