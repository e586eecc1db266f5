/// Estado agregado de una corrida.
///
/// - `Success`: ningún step falló.
/// - `Partial`: al menos un step falló y al menos uno terminó bien.
/// - `Failure`: hubo fallos y ningún step terminó bien.
///
/// Los steps `Skipped` no cuentan como fallo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Partial,
    Failure,
}
