use cucumber::given;

use crate::cucumber::{table_world::OrderSystem, TableWorld};

#[given("a fresh install with the demo catalog")]
async fn fresh_database(world: &mut TableWorld) {
    let system = OrderSystem::new().await;
    world.system = Some(system);
}
