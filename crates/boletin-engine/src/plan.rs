//! The SII step plan.
//!
//! Ordered step descriptors with their cascading locator strategies. The
//! strategy order is deliberate: the portal's stable element IDs first,
//! attribute matches next, loose visible-text matches last. The portal offers
//! no API contract, so selector drift is absorbed here and nowhere else.

use crate::workflow::Phase;
use boletin_core::step::StepDescriptor;
use boletin_core::strategy::{FieldValue, Locator, ResolutionStrategy};
use std::time::Duration;

pub const LOGIN_URL: &str = "https://zeusr.sii.cl//AUT2000/InicioAutenticacion/IngresoRutClave.html?https://misiir.sii.cl/cgi_misii/siihome.cgi";

/// Presence of the main menu reliably indicates a logged-in session.
pub fn post_login_landmark() -> Locator {
    Locator::css("#main-menu")
}

/// The annual report renders its monthly totals in this fixed-shape table.
pub fn report_table() -> Locator {
    Locator::css(r#"table[width="630"][border="1"]"#)
}

/// Which pass of the report a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Emitted,
    Received,
}

/// What the executor runs for a step beyond plain strategy resolution.
#[derive(Debug, Clone)]
pub enum StepBody {
    /// Navigate to a fixed URL and let it settle.
    Navigate { url: String },
    /// Resolve the step's strategies and perform the matched action.
    Act,
    /// Like `Act`, but a full navigation is expected afterwards.
    ActThenNavigation { nav_timeout: Duration },
    /// Two-path login confirmation: a navigation event within
    /// `nav_timeout`, or the post-login landmark within `landmark_timeout`.
    /// The portal sometimes swaps the DOM in place instead of navigating, so
    /// neither check may be assumed exclusively.
    ConfirmLogin {
        landmark: Locator,
        nav_timeout: Duration,
        landmark_timeout: Duration,
    },
    /// Extract and analyze the report table for `branch`.
    ExtractTable { table: Locator, branch: Branch },
    /// Capture zero evidence if the last extraction for `branch` was
    /// all-zero; otherwise the step is skipped.
    CaptureZeroEvidence { branch: Branch },
    /// Persist the report as PDF: click a print/download control when one
    /// resolves, then render the page.
    SaveReportPdf,
}

/// One entry of the ordered plan.
#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub descriptor: StepDescriptor,
    pub body: StepBody,
    pub phase: Phase,
}

impl WorkflowStep {
    fn new(descriptor: StepDescriptor, body: StepBody, phase: Phase) -> Self {
        Self {
            descriptor,
            body,
            phase,
        }
    }
}

/// Authenticate, walk the menu chain to the emitted-receipts annual report,
/// extract, and conditionally capture.
pub fn emitted_plan() -> Vec<WorkflowStep> {
    let element_timeout = Duration::from_secs(20);
    let mut steps = Vec::new();
    let mut ordinal = 0;
    let mut next = |name: &str| {
        ordinal += 1;
        StepDescriptor::new(name, ordinal)
    };

    steps.push(WorkflowStep::new(
        next("open login page").with_timeout(Duration::from_secs(45)),
        StepBody::Navigate {
            url: LOGIN_URL.to_string(),
        },
        Phase::Authenticating,
    ));

    steps.push(WorkflowStep::new(
        next("enter rut")
            .with_strategies(vec![
                ResolutionStrategy::fill(Locator::css("#rutcntr"), FieldValue::Identity),
                ResolutionStrategy::fill(Locator::css(r#"input[name="rutcntr"]"#), FieldValue::Identity),
            ])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::Authenticating,
    ));

    steps.push(WorkflowStep::new(
        next("enter clave")
            .with_strategies(vec![
                ResolutionStrategy::fill(Locator::css("#clave"), FieldValue::Secret),
                ResolutionStrategy::fill(Locator::css(r#"input[type="password"]"#), FieldValue::Secret),
            ])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::Authenticating,
    ));

    steps.push(WorkflowStep::new(
        next("submit login")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::css("#bt_ingresar")),
                ResolutionStrategy::click(Locator::text("Ingresar")),
            ])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::Authenticating,
    ));

    steps.push(WorkflowStep::new(
        next("confirm login").with_timeout(Duration::from_secs(30)),
        StepBody::ConfirmLogin {
            landmark: post_login_landmark(),
            nav_timeout: Duration::from_secs(15),
            landmark_timeout: Duration::from_secs(10),
        },
        Phase::Authenticating,
    ));

    steps.push(WorkflowStep::new(
        next("open services online menu")
            .with_strategies(vec![
                ResolutionStrategy::hover(Locator::css(
                    r#"#main-menu li.dropdown a[href="https://www.sii.cl/servicios_online/"]"#,
                )),
                ResolutionStrategy::hover(Locator::text("Servicios online")),
            ])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::NavigatingMenu,
    ));

    steps.push(WorkflowStep::new(
        next("open honorarios menu")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::css(
                    r#"#main-menu .dropdown-menu a[href="https://www.sii.cl/servicios_online/1040-.html"]"#,
                )),
                ResolutionStrategy::click(Locator::attr("href", "1040-")),
                ResolutionStrategy::click(Locator::text("Boletas de honorarios")),
            ])
            .with_timeout(element_timeout),
        StepBody::ActThenNavigation {
            nav_timeout: Duration::from_secs(15),
        },
        Phase::NavigatingMenu,
    ));

    steps.push(WorkflowStep::new(
        next("open emitter section")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::text("Emisor de boleta de honorarios")),
                ResolutionStrategy::click(Locator::text("Emisor de boleta")),
                ResolutionStrategy::click(Locator::attr("href", "emisor")),
            ])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::NavigatingMenu,
    ));

    steps.push(WorkflowStep::new(
        next("open queries section")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::text(
                    "Consultas sobre boletas de honorarios electrónicas",
                )),
                ResolutionStrategy::click(Locator::text("Consultas sobre boletas")),
            ])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::Querying,
    ));

    steps.push(WorkflowStep::new(
        next("open emitted receipts query")
            .with_strategies(vec![ResolutionStrategy::click(Locator::text(
                "Consultar boletas emitidas",
            ))])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::Querying,
    ));

    steps.push(WorkflowStep::new(
        next("trigger annual report")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::css("#cmdconsultar124")),
                ResolutionStrategy::click(Locator::css(r#"input[onclick*="validar_anual"]"#)),
                ResolutionStrategy::click(Locator::text("Consultar")),
            ])
            .with_timeout(Duration::from_secs(30)),
        StepBody::Act,
        Phase::Querying,
    ));

    steps.push(WorkflowStep::new(
        next("extract annual totals")
            .with_timeout(element_timeout)
            .optional(),
        StepBody::ExtractTable {
            table: report_table(),
            branch: Branch::Emitted,
        },
        Phase::ExtractingTable,
    ));

    steps.push(WorkflowStep::new(
        next("capture zero evidence")
            .with_timeout(Duration::from_secs(30))
            .optional(),
        StepBody::CaptureZeroEvidence {
            branch: Branch::Emitted,
        },
        Phase::CapturingArtifact,
    ));

    steps.push(WorkflowStep::new(
        next("save report pdf")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::css(r#"input[value="Imprimir"]"#)),
                ResolutionStrategy::click(Locator::text("Imprimir")),
                ResolutionStrategy::click(Locator::text("Descargar")),
                ResolutionStrategy::click(Locator::attr("href", ".pdf")),
            ])
            .with_timeout(Duration::from_secs(60))
            .optional(),
        StepBody::SaveReportPdf,
        Phase::CapturingArtifact,
    ));

    steps
}

/// Second pass over received receipts. Entered only after the emitted branch
/// succeeds; any failure here aborts the branch without reverting that
/// success.
pub fn received_plan(start_ordinal: usize) -> Vec<WorkflowStep> {
    let element_timeout = Duration::from_secs(20);
    let mut steps = Vec::new();
    let mut ordinal = start_ordinal;
    let mut next = |name: &str| {
        ordinal += 1;
        StepDescriptor::new(name, ordinal)
    };

    steps.push(WorkflowStep::new(
        next("open received receipts query")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::text("Consultar boletas recibidas")),
                ResolutionStrategy::click(Locator::attr("href", "MenuConsultasContribRec")),
            ])
            .with_timeout(element_timeout),
        StepBody::Act,
        Phase::NavigatingAux,
    ));

    steps.push(WorkflowStep::new(
        next("trigger received annual report")
            .with_strategies(vec![
                ResolutionStrategy::click(Locator::css(
                    r#"input[onclick*="validar_anual_rec"]"#,
                )),
                ResolutionStrategy::click(Locator::text("Consultar")),
            ])
            .with_timeout(Duration::from_secs(30)),
        StepBody::Act,
        Phase::QueryingAux,
    ));

    steps.push(WorkflowStep::new(
        next("extract received totals")
            .with_timeout(element_timeout)
            .optional(),
        StepBody::ExtractTable {
            table: report_table(),
            branch: Branch::Received,
        },
        Phase::ExtractingAux,
    ));

    steps.push(WorkflowStep::new(
        next("capture received zero evidence")
            .with_timeout(Duration::from_secs(30))
            .optional(),
        StepBody::CaptureZeroEvidence {
            branch: Branch::Received,
        },
        Phase::CapturingAux,
    ));

    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_strictly_increasing() {
        let emitted = emitted_plan();
        let received = received_plan(emitted.len());
        let ordinals: Vec<usize> = emitted
            .iter()
            .chain(received.iter())
            .map(|s| s.descriptor.ordinal)
            .collect();
        for pair in ordinals.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(ordinals[0], 1);
    }

    #[test]
    fn menu_chain_is_required_and_extraction_is_not() {
        let plan = emitted_plan();
        let required: Vec<bool> = plan.iter().map(|s| s.descriptor.required).collect();
        // Everything up to and including the report trigger must halt the
        // run on failure; extraction and capture only degrade it.
        assert!(required[..11].iter().all(|r| *r));
        assert!(required[11..].iter().all(|r| !*r));
    }
}
