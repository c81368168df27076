use glam::Vec2;

/// Position component - world pixel coordinates of the entity's center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// Player marker component
#[derive(Debug, Clone, Copy)]
pub struct Player;

/// Movement speed in world pixels per second
#[derive(Debug, Clone, Copy)]
pub struct Speed(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Spider,
    Skeleton,
    Goblin,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Spider, EnemyKind::Skeleton, EnemyKind::Goblin];
}

/// Enemy component
#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub kind: EnemyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    HealthPotion,
    SpeedPotion,
    Poison,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::HealthPotion, ItemKind::SpeedPotion, ItemKind::Poison];
}

/// Item lying on the floor, waiting to be picked up
#[derive(Debug, Clone, Copy)]
pub struct Collectible {
    pub kind: ItemKind,
}

/// Index of the room an entity was spawned in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRoom(pub usize);
