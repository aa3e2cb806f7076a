use std::time::Instant;

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::compose::{Artifact, Compositor};
use crate::config::BadgeConfig;
use crate::consts::PARALLEL_DESIGN_THRESHOLD;
use crate::design::{Design, DesignId, RenderOutcome};
use crate::error::{CheckoutError, ConstraintViolation, Result};
use crate::pricing::{summarize, OrderSummary, SessionMode};

/// One rendered badge in a checkout handoff.
#[derive(Clone, Debug, Serialize)]
pub struct HandoffArtifact {
    pub design_id: DesignId,
    /// Number of physical badges to print from this artifact.
    pub copies: u32,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "image", serialize_with = "serialize_data_url")]
    pub artifact: Artifact,
}

fn serialize_data_url<S: Serializer>(artifact: &Artifact, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&artifact.to_data_url())
}

/// Everything the order-submission collaborator needs.
#[derive(Clone, Debug, Serialize)]
pub struct OrderHandoff {
    #[serde(flatten)]
    pub summary: OrderSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication_count: Option<u32>,
    pub artifacts: Vec<HandoffArtifact>,
}

/// An order in progress: the design slots, their renders and the pricing
/// derived from them.
#[derive(Debug)]
pub struct Session {
    mode: SessionMode,
    designs: Vec<Design>,
    active: usize,
    last_id: u64,
    replication_count: u32,
    config: BadgeConfig,
    compositor: Compositor,
}

impl Session {
    /// Start a session with a single empty slot.
    pub fn new(mode: SessionMode, config: BadgeConfig, compositor: Compositor) -> Result<Self> {
        config.validate()?;
        let replication_count = config.pricing.event_minimum;
        let mut session = Self {
            mode,
            designs: Vec::new(),
            active: 0,
            last_id: 0,
            replication_count,
            config,
            compositor,
        };
        let first = session.mint_design();
        session.designs.push(first);
        Ok(session)
    }

    fn mint_design(&mut self) -> Design {
        self.last_id += 1;
        Design::new(DesignId(self.last_id), &self.config.designer)
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn config(&self) -> &BadgeConfig {
        &self.config
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Design {
        &self.designs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Design {
        &mut self.designs[self.active]
    }

    pub fn design(&self, id: DesignId) -> Option<&Design> {
        self.designs.iter().find(|d| d.id() == id)
    }

    pub fn design_mut(&mut self, id: DesignId) -> Option<&mut Design> {
        self.designs.iter_mut().find(|d| d.id() == id)
    }

    /// Append an empty slot and make it active.
    pub fn add_slot(&mut self) -> std::result::Result<DesignId, ConstraintViolation> {
        if self.mode == SessionMode::Event {
            warn!("Refused to add a slot to an event order");
            return Err(ConstraintViolation::EventModeSingleDesign);
        }
        let design = self.mint_design();
        let id = design.id();
        self.designs.push(design);
        self.active = self.designs.len() - 1;
        debug!(design = %id, slots = self.designs.len(), "Added design slot");
        Ok(id)
    }

    /// Remove the slot at `index`; the last remaining slot is kept.
    pub fn remove_slot(&mut self, index: usize) -> std::result::Result<DesignId, ConstraintViolation> {
        if self.mode == SessionMode::Event {
            warn!("Refused to remove the slot of an event order");
            return Err(ConstraintViolation::EventModeSingleDesign);
        }
        let total = self.designs.len();
        if index >= total {
            return Err(ConstraintViolation::SlotIndexOutOfRange { index, total });
        }
        if total == 1 {
            warn!("Refused to remove the last design slot");
            return Err(ConstraintViolation::LastSlot);
        }

        let removed = self.designs.remove(index);
        if index <= self.active {
            self.active = self.active.saturating_sub(1);
        }
        self.active = self.active.min(self.designs.len() - 1);
        debug!(design = %removed.id(), slots = self.designs.len(), "Removed design slot");
        Ok(removed.id())
    }

    pub fn set_active(&mut self, index: usize) -> std::result::Result<(), ConstraintViolation> {
        let total = self.designs.len();
        if index >= total {
            return Err(ConstraintViolation::SlotIndexOutOfRange { index, total });
        }
        self.active = index;
        Ok(())
    }

    /// Switch order type. Entering event mode keeps only the active design.
    pub fn set_mode(&mut self, mode: SessionMode) {
        if mode == self.mode {
            return;
        }
        if mode == SessionMode::Event {
            let keep = self.designs.swap_remove(self.active);
            self.designs = vec![keep];
            self.active = 0;
        }
        self.mode = mode;
        info!(mode = %mode, "Switched order mode");
    }

    pub fn replication_count(&self) -> u32 {
        self.replication_count
    }

    pub fn event_minimum(&self) -> u32 {
        self.config.pricing.event_minimum
    }

    /// Set the event replication count, clamped up to the event minimum.
    pub fn set_replication_count(&mut self, count: u32) -> u32 {
        self.replication_count = count.max(self.event_minimum());
        self.replication_count
    }

    pub fn increment_replication(&mut self) -> u32 {
        self.set_replication_count(self.replication_count.saturating_add(1))
    }

    /// Decrease by one; a no-op at the event minimum.
    pub fn decrement_replication(&mut self) -> u32 {
        if self.replication_count > self.event_minimum() {
            self.replication_count -= 1;
        }
        self.replication_count
    }

    fn non_empty_count(&self) -> u32 {
        self.designs.iter().filter(|d| !d.is_empty()).count() as u32
    }

    /// Quantity, unit price, total and checkout validity for the current state.
    pub fn summary(&self) -> OrderSummary {
        summarize(
            self.mode,
            self.non_empty_count(),
            self.replication_count,
            &self.config.pricing,
        )
    }

    /// Fire every design whose debounce window has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<(DesignId, RenderOutcome)> {
        let export_size = self.config.designer.export_size;
        let compositor = &self.compositor;
        self.designs
            .iter_mut()
            .filter_map(|d| d.tick(now, compositor, export_size).map(|o| (d.id(), o)))
            .collect()
    }

    /// Render every design now, superseding pending debounced renders.
    pub fn export_all(&mut self) -> Vec<(DesignId, RenderOutcome)> {
        let all: Vec<usize> = (0..self.designs.len()).collect();
        self.export_indices(&all)
    }

    fn export_indices(&mut self, indices: &[usize]) -> Vec<(DesignId, RenderOutcome)> {
        let export_size = self.config.designer.export_size;
        let compositor = &self.compositor;
        let designs = &self.designs;

        let render = |&i: &usize| (i, compositor.render(designs[i].model(), export_size));
        let results: Vec<_> = if indices.len() >= PARALLEL_DESIGN_THRESHOLD {
            indices.par_iter().map(render).collect()
        } else {
            indices.iter().map(render).collect()
        };

        results
            .into_iter()
            .map(|(i, result)| {
                let design = &mut self.designs[i];
                (design.id(), design.store(result))
            })
            .collect()
    }

    /// Bring every artifact up to date and package the order.
    pub fn checkout(&mut self) -> std::result::Result<OrderHandoff, CheckoutError> {
        let summary = self.summary();
        if !summary.is_valid {
            return Err(match self.mode {
                SessionMode::Event if self.non_empty_count() > 0 => CheckoutError::BelowEventMinimum {
                    requested: self.replication_count,
                    minimum: self.event_minimum(),
                },
                _ => CheckoutError::NoDesigns,
            });
        }

        let stale: Vec<usize> = self
            .designs
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_empty() && d.fresh_artifact().is_none())
            .map(|(i, _)| i)
            .collect();
        for (id, outcome) in self.export_indices(&stale) {
            if let RenderOutcome::Failed(source) = outcome {
                return Err(CheckoutError::Render { id: id.0, source });
            }
        }

        let copies = match self.mode {
            SessionMode::Personal => 1,
            SessionMode::Event => self.replication_count,
        };
        let artifacts: Vec<HandoffArtifact> = self
            .designs
            .iter()
            .filter_map(|d| {
                d.fresh_artifact().map(|a| HandoffArtifact {
                    design_id: d.id(),
                    copies,
                    width: a.width,
                    height: a.height,
                    artifact: a.clone(),
                })
            })
            .collect();

        info!(
            mode = %self.mode,
            quantity = summary.quantity,
            total_cents = summary.total_cents,
            artifacts = artifacts.len(),
            "Order ready for submission"
        );
        Ok(OrderHandoff {
            summary,
            replication_count: (self.mode == SessionMode::Event).then_some(self.replication_count),
            artifacts,
        })
    }
}
