//! Composable constraint sources

use crate::error::SolveError;
use crate::model::ModelBuilder;

/// One independent rule of a puzzle family.
///
/// A puzzle instance is a list of contributors applied in order to a single
/// builder; variables are shared through their roles, so contributors never
/// hold each other's handles.
pub trait ConstraintContributor {
    fn name(&self) -> &'static str;

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError>;
}

/// Apply `contributors` in order, returning how many constraints each one added
pub fn apply_all(
    contributors: &[Box<dyn ConstraintContributor>],
    builder: &mut ModelBuilder,
) -> Result<Vec<(&'static str, usize)>, SolveError> {
    let mut added = Vec::with_capacity(contributors.len());
    for contributor in contributors {
        let before = builder.constraint_count();
        contributor.contribute(builder)?;
        added.push((contributor.name(), builder.constraint_count() - before));
    }
    Ok(added)
}
