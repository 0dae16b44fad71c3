//! Render script programs and loading

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use super::api::RenderApi;
use super::message::Message;
use super::{RenderScriptError, ScriptResult};

bitflags! {
    /// Entry points a program defines
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntryPoints: u8 {
        /// `init`
        const INIT = 1 << 0;
        /// `update`
        const UPDATE = 1 << 1;
        /// `on_message`
        const ON_MESSAGE = 1 << 2;
        /// `on_reload`
        const ON_RELOAD = 1 << 3;
    }
}

/// One script entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// Called once after the instance is created
    Init,
    /// Called every frame
    Update,
    /// Called per inbound message
    OnMessage,
    /// Called after the script is reloaded
    OnReload,
}

impl EntryPoint {
    /// Entry point name as scripts spell it
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Update => "update",
            Self::OnMessage => "on_message",
            Self::OnReload => "on_reload",
        }
    }

    /// Flag for this entry point
    pub const fn flag(self) -> EntryPoints {
        match self {
            Self::Init => EntryPoints::INIT,
            Self::Update => EntryPoints::UPDATE,
            Self::OnMessage => EntryPoints::ON_MESSAGE,
            Self::OnReload => EntryPoints::ON_RELOAD,
        }
    }
}

/// Compiled render script
///
/// Only entry points reported by [`entry_points`](Self::entry_points) are
/// called; the default bodies do nothing.
pub trait RenderScriptProgram {
    /// Which entry points this program defines
    fn entry_points(&self) -> EntryPoints;

    /// `init()`
    fn init(&self, _render: &mut RenderApi<'_>) -> ScriptResult<()> {
        Ok(())
    }

    /// `update()`
    fn update(&self, _render: &mut RenderApi<'_>) -> ScriptResult<()> {
        Ok(())
    }

    /// `on_message(id, payload, sender)`
    fn on_message(&self, _render: &mut RenderApi<'_>, _message: &Message) -> ScriptResult<()> {
        Ok(())
    }

    /// `on_reload()`
    fn on_reload(&self, _render: &mut RenderApi<'_>) -> ScriptResult<()> {
        Ok(())
    }
}

/// Turns script source into a program
pub trait ScriptLoader {
    /// Compile `source`; `filename` is used in error messages
    fn load(&self, source: &str, filename: &str) -> ScriptResult<Box<dyn RenderScriptProgram>>;
}

type ProgramFactory = Box<dyn Fn() -> Box<dyn RenderScriptProgram>>;

/// Loader for programs compiled into the host
///
/// A source names one registered program. Blank lines and lines starting
/// with `--` are ignored.
#[derive(Default)]
pub struct ProgramRegistry {
    factories: HashMap<String, ProgramFactory>,
}

impl ProgramRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn RenderScriptProgram> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered program names
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }
}

impl ScriptLoader for ProgramRegistry {
    fn load(&self, source: &str, filename: &str) -> ScriptResult<Box<dyn RenderScriptProgram>> {
        let load_error = |reason: String| RenderScriptError::Load {
            filename: filename.to_string(),
            reason,
        };

        let mut tokens = source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("--"))
            .flat_map(str::split_whitespace);

        let name = tokens
            .next()
            .ok_or_else(|| load_error("unexpected end of source".to_string()))?;
        if let Some(extra) = tokens.next() {
            return Err(load_error(format!("unexpected '{extra}' after '{name}'")));
        }

        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| load_error(format!("no program named '{name}'")))?;
        Ok(factory())
    }
}

impl fmt::Debug for ProgramRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramRegistry")
            .field("programs", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A loaded render script, shareable between instances
pub struct RenderScript {
    program: Box<dyn RenderScriptProgram>,
    filename: String,
}

/// Render script shared by the instances that run it
pub type SharedRenderScript = Rc<RefCell<RenderScript>>;

impl RenderScript {
    /// Load a script; fails without creating anything on a load error
    pub fn new(loader: &dyn ScriptLoader, source: &str, filename: &str) -> ScriptResult<Self> {
        let program = loader.load(source, filename).map_err(|err| {
            log::error!("{}", err);
            err
        })?;
        Ok(Self {
            program,
            filename: filename.to_string(),
        })
    }

    /// Load a script wrapped for sharing
    pub fn new_shared(
        loader: &dyn ScriptLoader,
        source: &str,
        filename: &str,
    ) -> ScriptResult<SharedRenderScript> {
        Self::new(loader, source, filename).map(|script| Rc::new(RefCell::new(script)))
    }

    /// Replace the program; on failure the current program is kept
    pub fn reload(
        &mut self,
        loader: &dyn ScriptLoader,
        source: &str,
        filename: &str,
    ) -> ScriptResult<()> {
        match loader.load(source, filename) {
            Ok(program) => {
                self.program = program;
                self.filename = filename.to_string();
                log::info!("Reloaded render script '{}'", filename);
                Ok(())
            }
            Err(err) => {
                log::error!("{}; keeping '{}'", err, self.filename);
                Err(err)
            }
        }
    }

    /// Entry points the current program defines
    pub fn entry_points(&self) -> EntryPoints {
        self.program.entry_points()
    }

    /// Current program
    pub fn program(&self) -> &dyn RenderScriptProgram {
        self.program.as_ref()
    }

    /// File the current program was loaded from
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Debug for RenderScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScript")
            .field("filename", &self.filename)
            .field("entry_points", &self.entry_points())
            .finish()
    }
}
