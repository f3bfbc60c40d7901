/// Facing and movement command of an agent.
///
/// `Stop` is both an action (stand still) and the facing agents start with;
/// movement never turns an agent to face `Stop`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    /// Every direction in legal-action enumeration order.
    pub const ALL: [Direction; 5] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Stop,
    ];

    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }

    /// Quarter turn counter-clockwise.
    pub const fn left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
            Direction::West => Direction::South,
            Direction::Stop => Direction::Stop,
        }
    }

    /// Quarter turn clockwise.
    pub const fn right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::South => Direction::West,
            Direction::East => Direction::South,
            Direction::West => Direction::North,
            Direction::Stop => Direction::Stop,
        }
    }

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }

    /// Movement vector for one step at `speed`.
    pub fn vector(self, speed: f64) -> (f64, f64) {
        let (dx, dy) = self.delta();
        (f64::from(dx) * speed, f64::from(dy) * speed)
    }

    /// Direction implied by a movement vector; the zero vector maps to `Stop`.
    pub fn from_vector(dx: f64, dy: f64) -> Self {
        if dy > 0.0 {
            Direction::North
        } else if dy < 0.0 {
            Direction::South
        } else if dx < 0.0 {
            Direction::West
        } else if dx > 0.0 {
            Direction::East
        } else {
            Direction::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_compose_to_reverse() {
        for direction in Direction::CARDINAL {
            assert_eq!(direction.left().left(), direction.reverse());
            assert_eq!(direction.right().left(), direction);
        }
        assert_eq!(Direction::Stop.reverse(), Direction::Stop);
    }

    #[test]
    fn vector_round_trips_through_from_vector() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.vector(0.5);
            assert_eq!(Direction::from_vector(dx, dy), direction);
        }
    }

    #[test]
    fn parses_display_names() {
        assert_eq!("South".parse::<Direction>().ok(), Some(Direction::South));
        assert_eq!(Direction::West.to_string(), "West");
    }
}
