//! Artifact Store y sink con alcance por step.
//!
//! - `ArtifactSink`: lo recibe cada step durante `execute`. Sólo puede crear
//!   claves dentro de su propio namespace (`step`) y no ve artifacts de otros
//!   steps. Lo escrito queda "en staging" hasta que el engine decide.
//! - `ArtifactStore`: acumula los artifacts confirmados de la corrida en
//!   orden de inserción (= orden de ejecución = orden del plan).
//!
//! Invariante: una clave `(step, subject, kind)` aparece a lo sumo una vez.
//! Un `put` duplicado es un error (`ArtifactError::Duplicate`) y nunca
//! sobrescribe.
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::errors::ArtifactError;
use crate::hashing::hash_value;
use crate::model::{Artifact, ArtifactKey, ArtifactPayload};

#[derive(Debug)]
pub struct ArtifactSink {
    namespace: String,
    staged: Vec<Artifact>,
    keys: HashSet<ArtifactKey>,
}

impl ArtifactSink {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(),
               staged: Vec::new(),
               keys: HashSet::new() }
    }

    pub fn namespace(&self) -> &str { &self.namespace }

    /// Agrega un artifact `namespace.subject.kind` y devuelve su nombre.
    pub fn put(&mut self,
               subject: impl Into<String>,
               kind: impl Into<String>,
               payload: ArtifactPayload)
               -> Result<String, ArtifactError> {
        let key = ArtifactKey::new(self.namespace.clone(), subject, kind);
        if !self.keys.insert(key.clone()) {
            return Err(ArtifactError::Duplicate(key.name()));
        }
        let art = Artifact::new_unhashed(key, payload);
        let name = art.name.clone();
        self.staged.push(art);
        Ok(name)
    }

    pub fn staged(&self) -> &[Artifact] { &self.staged }

    pub fn names(&self) -> Vec<String> {
        self.staged.iter().map(|a| a.name.clone()).collect()
    }

    pub fn len(&self) -> usize { self.staged.len() }

    pub fn is_empty(&self) -> bool { self.staged.is_empty() }

    pub(crate) fn into_artifacts(self) -> Vec<Artifact> { self.staged }
}

#[derive(Debug, Default)]
pub struct ArtifactStore {
    entries: IndexMap<ArtifactKey, Artifact>,
}

impl ArtifactStore {
    pub fn new() -> Self { Self::default() }

    /// Inserta un artifact bajo `(step, subject, kind)`.
    pub fn put(&mut self,
               step: &str,
               subject: &str,
               kind: &str,
               payload: ArtifactPayload)
               -> Result<&Artifact, ArtifactError> {
        let key = ArtifactKey::new(step, subject, kind);
        if self.entries.contains_key(&key) {
            return Err(ArtifactError::Duplicate(key.name()));
        }
        let art = Self::hashed(Artifact::new_unhashed(key.clone(), payload));
        Ok(self.entries.entry(key).or_insert(art))
    }

    /// Confirma todo lo que un step dejó en su sink. Es atómico: si alguna
    /// clave ya existe no se inserta nada.
    pub fn commit(&mut self, sink: ArtifactSink) -> Result<Vec<String>, ArtifactError> {
        if let Some(dup) = sink.staged().iter().find(|a| self.entries.contains_key(&a.key)) {
            return Err(ArtifactError::Duplicate(dup.name.clone()));
        }
        let mut names = Vec::with_capacity(sink.len());
        for art in sink.into_artifacts() {
            names.push(art.name.clone());
            self.entries.insert(art.key.clone(), Self::hashed(art));
        }
        Ok(names)
    }

    /// Artifacts en orden de inserción.
    pub fn manifest(&self) -> Vec<&Artifact> {
        self.entries.values().collect()
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.entries.values().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub(crate) fn into_manifest(self) -> Vec<Artifact> {
        self.entries.into_values().collect()
    }

    fn hashed(mut art: Artifact) -> Artifact {
        let payload = serde_json::to_value(&art.payload).unwrap_or_default();
        art.hash = hash_value(&payload);
        art
    }
}
