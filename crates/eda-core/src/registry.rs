//! Registro de steps: asocia un identificador (`"profile"`, ...) con un
//! constructor que valida las opciones y produce el step ejecutable.
//!
//! El tipo `S` suele ser un enum cerrado con una variante por tipo de step;
//! agregar un tipo nuevo es registrar un constructor más.
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::ConfigError;
use crate::plan::StepSpec;

pub type StepConstructor<S> = Box<dyn Fn(&Value) -> Result<S, ConfigError> + Send + Sync>;

pub struct StepRegistry<S> {
    constructors: IndexMap<String, StepConstructor<S>>,
}

impl<S> StepRegistry<S> {
    pub fn new() -> Self {
        Self { constructors: IndexMap::new() }
    }

    /// Registra (o reemplaza) el constructor de `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, ctor: F) -> &mut Self
        where F: Fn(&Value) -> Result<S, ConfigError> + Send + Sync + 'static
    {
        self.constructors.insert(kind.into(), Box::new(ctor));
        self
    }

    /// Variante encadenable de `register`.
    pub fn with<F>(mut self, kind: impl Into<String>, ctor: F) -> Self
        where F: Fn(&Value) -> Result<S, ConfigError> + Send + Sync + 'static
    {
        self.register(kind, ctor);
        self
    }

    pub fn contains(&self, kind: &str) -> bool { self.constructors.contains_key(kind) }

    /// Tipos registrados en orden de registro.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.constructors.keys().map(String::as_str)
    }

    /// Construye el step de un spec. Falla con `UnknownStepKind` si el tipo
    /// no está registrado o con el error del constructor si las opciones no
    /// son válidas.
    pub fn resolve(&self, spec: &StepSpec) -> Result<S, ConfigError> {
        let ctor = self.constructors
                       .get(&spec.kind)
                       .ok_or_else(|| ConfigError::UnknownStepKind(spec.kind.clone()))?;
        ctor(&spec.options)
    }
}

impl<S> Default for StepRegistry<S> {
    fn default() -> Self { Self::new() }
}

impl<S> fmt::Debug for StepRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
         .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_unknown_kind_fails() {
        let reg: StepRegistry<u32> = StepRegistry::new().with("one", |_| Ok(1));
        let err = reg.resolve(&StepSpec::new("two", json!({}))).unwrap_err();
        assert_eq!(err, ConfigError::UnknownStepKind("two".into()));
        assert_eq!(reg.resolve(&StepSpec::new("one", json!({}))).unwrap(), 1);
        assert_eq!(reg.kinds().collect::<Vec<_>>(), vec!["one"]);
    }
}
