//! Taxpayer credentials for a single run.
//!
//! Held in process memory only. The clave is never written to disk and is
//! redacted from `Debug` output so it cannot leak through logs.

/// RUT + clave tributaria pair, immutable for the duration of one run.
#[derive(Clone)]
pub struct Credentials {
    rut: String,
    clave: String,
}

impl Credentials {
    pub fn new(rut: impl Into<String>, clave: impl Into<String>) -> Self {
        Self {
            rut: rut.into(),
            clave: clave.into(),
        }
    }

    /// The RUT exactly as entered (dots and dash included).
    pub fn rut(&self) -> &str {
        &self.rut
    }

    pub fn clave(&self) -> &str {
        &self.clave
    }

    /// Filesystem-safe identity token: punctuation stripped, check digit
    /// uppercased. `"12.345.678-9"` becomes `"123456789"`.
    pub fn sanitized_identity(&self) -> String {
        self.rut
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("rut", &self.rut)
            .field("clave", &"********")
            .finish()
    }
}
