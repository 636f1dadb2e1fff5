//! Region-partitioning puzzle rules

use super::contributor::ConstraintContributor;
use crate::error::SolveError;
use crate::grid::{Cell, GridTopology};
use crate::model::{Constraint, ModelBuilder, VarId, VariableRole};
use crate::regions::{prune_all, CandidateCells, ConnectivityEngine, Region};
use std::rc::Rc;
use tracing::info;

/// Regions of one instance together with their pruned candidate sets
#[derive(Debug, Clone)]
pub struct RegionLayout {
    regions: Vec<Region>,
    candidates: Vec<CandidateCells>,
}

impl RegionLayout {
    pub fn new(regions: Vec<Region>, topology: &GridTopology) -> Self {
        let candidates = prune_all(topology, &regions);
        Self { regions, candidates }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn candidates(&self, region: usize) -> Option<&CandidateCells> {
        self.candidates.get(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Region, &CandidateCells)> {
        self.regions.iter().zip(self.candidates.iter())
    }

    /// Cells the region may own: its centers plus its candidates
    pub fn may_contain(&self, region: usize, cell: Cell) -> bool {
        match (self.regions.get(region), self.candidates.get(region)) {
            (Some(r), Some(c)) => r.is_center(cell) || c.contains(cell),
            _ => false,
        }
    }
}

fn membership(builder: &mut ModelBuilder, cell: Cell, region: usize) -> Result<VarId, SolveError> {
    builder.add_variable(VariableRole::Membership { cell, region })
}

/// Every cell belongs to exactly one region
pub struct SingleOwnership {
    layout: Rc<RegionLayout>,
}

impl ConstraintContributor for SingleOwnership {
    fn name(&self) -> &'static str {
        "single ownership"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let topology = *builder.topology();
        let count = self.layout.regions().len();
        for cell in topology.cells() {
            let owners = (0..count)
                .map(|region| membership(builder, cell, region))
                .collect::<Result<Vec<_>, _>>()?;
            builder.add_constraint(Constraint::exactly(owners, 1));
        }
        Ok(())
    }
}

/// Center cells belong to their own region and to no other
pub struct CenterPinning {
    layout: Rc<RegionLayout>,
}

impl ConstraintContributor for CenterPinning {
    fn name(&self) -> &'static str {
        "center pinning"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let count = self.layout.regions().len();
        for owner in self.layout.regions() {
            for &cell in owner.centers() {
                for region in 0..count {
                    let var = membership(builder, cell, region)?;
                    builder.add_constraint(Constraint::fix(var, region == owner.index()));
                }
            }
        }
        Ok(())
    }
}

/// Cells outside a region's centers and candidates are not members
pub struct CandidateRestriction {
    layout: Rc<RegionLayout>,
}

impl ConstraintContributor for CandidateRestriction {
    fn name(&self) -> &'static str {
        "candidate restriction"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let topology = *builder.topology();
        for region in self.layout.regions() {
            for cell in topology.cells() {
                if !self.layout.may_contain(region.index(), cell) {
                    let var = membership(builder, cell, region.index())?;
                    builder.add_constraint(Constraint::fix(var, false));
                }
            }
        }
        Ok(())
    }
}

/// A forward-half candidate is a member exactly when its mirror is
pub struct SymmetricPairing {
    layout: Rc<RegionLayout>,
}

impl ConstraintContributor for SymmetricPairing {
    fn name(&self) -> &'static str {
        "symmetric pairing"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let topology = *builder.topology();
        for (region, candidates) in self.layout.iter() {
            for cell in candidates.forward_half(region) {
                let Some(mirror) = region.reflect(cell, &topology) else {
                    continue;
                };
                if mirror == cell {
                    continue;
                }
                let a = membership(builder, cell, region.index())?;
                let b = membership(builder, mirror, region.index())?;
                builder.add_constraint(Constraint::equal(a, b));
            }
        }
        Ok(())
    }
}

/// Path-indicator constraints keeping every region connected to its center
pub struct Connectivity {
    layout: Rc<RegionLayout>,
}

impl ConstraintContributor for Connectivity {
    fn name(&self) -> &'static str {
        "connectivity"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        for (region, candidates) in self.layout.iter() {
            let report = ConnectivityEngine::new(region, candidates).contribute(builder)?;
            info!(
                region = report.region,
                candidates = report.candidates,
                paths = report.paths,
                forced_out = report.forced_out.len(),
                "region connectivity"
            );
        }
        Ok(())
    }
}

/// Contributors for a region puzzle, in application order
pub fn contributors(layout: Rc<RegionLayout>) -> Vec<Box<dyn ConstraintContributor>> {
    vec![
        Box::new(SingleOwnership { layout: Rc::clone(&layout) }),
        Box::new(CenterPinning { layout: Rc::clone(&layout) }),
        Box::new(CandidateRestriction { layout: Rc::clone(&layout) }),
        Box::new(SymmetricPairing { layout: Rc::clone(&layout) }),
        Box::new(Connectivity { layout }),
    ]
}
