//! Small cities for tests.

use blockplan_core::{Block, BlockId, Brick, InMemoryCity, LandUse, ServiceCategory};

/// Builder for an [`InMemoryCity`].
#[derive(Debug, Clone, Default)]
pub struct CityFixture {
    blocks: Vec<Block>,
    categories: Vec<ServiceCategory>,
    costs: Vec<(BlockId, BlockId, f64)>,
}

impl CityFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_category(mut self, category: ServiceCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_standard_categories(mut self) -> Self {
        self.categories.extend(standard_categories());
        self
    }

    /// Connects two blocks in both directions.
    pub fn connect(mut self, a: BlockId, b: BlockId, cost: f64) -> Self {
        self.costs.push((a, b, cost));
        self.costs.push((b, a, cost));
        self
    }

    /// Connects one direction only.
    pub fn connect_one_way(mut self, from: BlockId, to: BlockId, cost: f64) -> Self {
        self.costs.push((from, to, cost));
        self
    }

    /// Connects every pair of blocks added so far.
    pub fn connect_all(mut self, cost: f64) -> Self {
        let ids: Vec<BlockId> = self.blocks.iter().map(|b| b.id).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                self = self.connect(*a, *b, cost);
            }
        }
        self
    }

    /// # Panics
    ///
    /// Panics if the blocks reference unknown categories or repeat an id.
    pub fn build(self) -> InMemoryCity {
        let mut city = InMemoryCity::new(self.blocks, self.categories)
            .expect("fixture city should be consistent");
        for (from, to, cost) in self.costs {
            city.set_travel_cost(from, to, cost);
        }
        city
    }
}

/// A handful of services with realistic rates and bricks.
pub fn standard_categories() -> Vec<ServiceCategory> {
    vec![
        ServiceCategory::new("schools", 120.0, 15.0)
            .with_land_use(LandUse::Residential)
            .with_brick(Brick::new(250.0, 3_000.0))
            .with_brick(Brick::new(100.0, 1_200.0).integrated()),
        ServiceCategory::new("kindergartens", 61.0, 10.0)
            .with_land_use(LandUse::Residential)
            .with_brick(Brick::new(60.0, 600.0).integrated()),
        ServiceCategory::new("pharmacies", 50.0, 10.0)
            .with_land_use(LandUse::Residential)
            .with_land_use(LandUse::Business)
            .with_brick(Brick::new(25.0, 150.0).integrated()),
        ServiceCategory::new("parks", 0.0, 30.0).with_land_use(LandUse::Recreation),
    ]
}

/// Two blocks: block 1 (10 000 m², Recreation, empty) converts to
/// Residential; block 2 next door houses 5 000 residents and no schools.
///
/// The only service is `schools` (100 per 1000, one 50-seat brick on
/// 500 m²), so block 1 sees a local deficit of 500 seats.
pub fn conversion_city() -> InMemoryCity {
    CityFixture::new()
        .with_category(
            ServiceCategory::new("schools", 100.0, 15.0)
                .with_land_use(LandUse::Residential)
                .with_brick(Brick::new(50.0, 500.0)),
        )
        .with_block(Block::new(1, 10_000.0).with_land_use(LandUse::Recreation))
        .with_block(
            Block::new(2, 20_000.0)
                .with_land_use(LandUse::Residential)
                .with_population(5_000),
        )
        .connect(1, 2, 5.0)
        .build()
}
