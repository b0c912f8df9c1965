//! The fixed catalog of named input sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the twelve logical inputs of a monthly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceName {
    /// Active employee roster.
    Ativos,
    /// Employees on vacation.
    Ferias,
    /// Terminated employees.
    Desligados,
    /// New hires for the period.
    Admissao,
    /// Employees on leave.
    Afastamentos,
    /// Apprentices.
    Aprendiz,
    /// Interns.
    Estagio,
    /// Staff working overseas.
    Exterior,
    /// Union to daily voucher value.
    BaseSindicato,
    /// Union to working days in the period.
    BaseDiasUteis,
    /// Monthly voucher sheet as sent to the provider.
    VrMensal,
    /// Precomputed final reference sheet.
    VrFinalRef,
}

impl SourceName {
    /// Every source, in load order.
    pub const ALL: [SourceName; 12] = [
        SourceName::Ativos,
        SourceName::Ferias,
        SourceName::Desligados,
        SourceName::Admissao,
        SourceName::Afastamentos,
        SourceName::Aprendiz,
        SourceName::Estagio,
        SourceName::Exterior,
        SourceName::BaseSindicato,
        SourceName::BaseDiasUteis,
        SourceName::VrMensal,
        SourceName::VrFinalRef,
    ];

    /// Sources whose registration ids are removed from the active roster.
    pub const EXCLUSIONS: [SourceName; 4] = [
        SourceName::Aprendiz,
        SourceName::Estagio,
        SourceName::Afastamentos,
        SourceName::Exterior,
    ];

    /// The logical key used in settings files and diagnostics.
    pub fn key(self) -> &'static str {
        match self {
            SourceName::Ativos => "ativos",
            SourceName::Ferias => "ferias",
            SourceName::Desligados => "desligados",
            SourceName::Admissao => "admissao",
            SourceName::Afastamentos => "afastamentos",
            SourceName::Aprendiz => "aprendiz",
            SourceName::Estagio => "estagio",
            SourceName::Exterior => "exterior",
            SourceName::BaseSindicato => "base_sindicato",
            SourceName::BaseDiasUteis => "base_dias_uteis",
            SourceName::VrMensal => "vr_mensal",
            SourceName::VrFinalRef => "vr_final_ref",
        }
    }

    /// The file name the source is read from unless overridden.
    pub fn default_file_name(self) -> &'static str {
        match self {
            SourceName::Ativos => "ATIVOS.xlsx",
            SourceName::Ferias => "FÉRIAS.xlsx",
            SourceName::Desligados => "DESLIGADOS.xlsx",
            SourceName::Admissao => "ADMISSÃOABRIL.xlsx",
            SourceName::Afastamentos => "AFASTAMENTOS.xlsx",
            SourceName::Aprendiz => "APRENDIZ.xlsx",
            SourceName::Estagio => "ESTÁGIO.xlsx",
            SourceName::Exterior => "EXTERIOR.xlsx",
            SourceName::BaseSindicato => "Basesindicatoxvalor.xlsx",
            SourceName::BaseDiasUteis => "Basediasuteis.xlsx",
            SourceName::VrMensal => "VRMENSAL05.2025.xlsx",
            SourceName::VrFinalRef => "VR_Mensal_05.2025_Final27ago.xlsx",
        }
    }

    /// Leading rows to discard before the header row.
    ///
    /// The working-days sheet carries a title row above its header. This is a
    /// property of the file layout and is not configurable.
    pub fn skip_rows(self) -> usize {
        match self {
            SourceName::BaseDiasUteis => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceName::ALL
            .into_iter()
            .find(|name| name.key() == s)
            .ok_or_else(|| format!("unknown source '{}'", s))
    }
}
