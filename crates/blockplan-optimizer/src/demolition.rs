//! Negative deltas that clear a converting block.

use blockplan_core::{Block, BlockId, CityModel, Result, UpdateRow, UpdateTable};

/// Removes every installed service of `block`, and its residents when
/// `delete_population` is set.
///
/// Instances of the same category sum into one negative delta.
pub fn demolition_row(block: &Block, delete_population: bool) -> UpdateRow {
    let mut row = UpdateRow::new();
    for service in &block.services {
        row.add_capacity(service.category.clone(), -service.capacity);
    }
    if delete_population {
        row.set_population(-(block.population as f64));
    }
    row
}

/// Demolition rows for `blocks`, residents included.
pub fn demolition_table<C, I>(city: &C, blocks: I) -> Result<UpdateTable>
where
    C: CityModel + ?Sized,
    I: IntoIterator<Item = BlockId>,
{
    let mut table = UpdateTable::new();
    for id in blocks {
        let block = city.block(id)?;
        table.merge_row(id, &demolition_row(block, true));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use blockplan_core::{BlockPlanError, InMemoryCity, ServiceCategory};

    use super::*;

    fn block() -> Block {
        Block::new(5, 2_000.0)
            .with_population(100)
            .with_service("a", 4.0)
            .with_service("b", 5.0)
            .with_service("a", 6.0)
    }

    #[test]
    fn test_with_population() {
        let row = demolition_row(&block(), true);
        assert_eq!(row.capacity("a"), Some(-10.0));
        assert_eq!(row.capacity("b"), Some(-5.0));
        assert_eq!(row.population(), Some(-100.0));
    }

    #[test]
    fn test_without_population() {
        let row = demolition_row(&block(), false);
        assert_eq!(row.capacity("a"), Some(-10.0));
        assert_eq!(row.capacity("b"), Some(-5.0));
        assert_eq!(row.population(), None);
    }

    #[test]
    fn test_empty_block_leaves_allocation_unchanged() {
        let row = demolition_row(&Block::new(1, 500.0), true);
        assert!(row.is_zero());

        let allocation = UpdateRow::new()
            .with_capacity("schools", 250.0)
            .with_population(40.0);
        assert_eq!(allocation.clone().merged(&row), allocation);
    }

    #[test]
    fn test_table_for_several_blocks() {
        let city = InMemoryCity::new(
            vec![block(), Block::new(6, 100.0).with_service("b", 2.0)],
            vec![ServiceCategory::new("a", 1.0, 1.0), ServiceCategory::new("b", 1.0, 1.0)],
        )
        .unwrap();

        let table = demolition_table(&city, [5, 6]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.capacity_delta(6, "b"), -2.0);
        assert_eq!(table.population_delta(5), -100.0);

        assert!(matches!(
            demolition_table(&city, [9]),
            Err(BlockPlanError::UnknownBlock(9))
        ));
    }
}
