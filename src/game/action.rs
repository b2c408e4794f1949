use serde::{Deserialize, Serialize};

/// Compass heading of the snake
///
/// The declaration order is clockwise, which is what makes relative turns
/// plain index arithmetic modulo 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All headings in clockwise order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Unit displacement as (row delta, column delta)
    pub fn displacement(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn opposite(&self) -> Direction {
        Self::from_index(self.index() + 2)
    }

    /// The heading a quarter turn clockwise from this one
    pub fn right_of(&self) -> Direction {
        SnakeAction::TurnRight.turn(*self)
    }
}

/// Action the agent picks each move, relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnakeAction {
    TurnLeft,
    Forward,
    TurnRight,
}

impl SnakeAction {
    /// Size of the action space
    pub const COUNT: usize = 3;

    /// All actions, in action-value vector order
    pub const ALL: [SnakeAction; SnakeAction::COUNT] = [
        SnakeAction::TurnLeft,
        SnakeAction::Forward,
        SnakeAction::TurnRight,
    ];

    /// Position of this action in an action-value vector
    pub fn index(&self) -> usize {
        match self {
            SnakeAction::TurnLeft => 0,
            SnakeAction::Forward => 1,
            SnakeAction::TurnRight => 2,
        }
    }

    /// Inverse of [`SnakeAction::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn delta(&self) -> isize {
        match self {
            SnakeAction::TurnLeft => -1,
            SnakeAction::Forward => 0,
            SnakeAction::TurnRight => 1,
        }
    }

    /// Heading that results from applying this action to `heading`
    pub fn turn(&self, heading: Direction) -> Direction {
        let count = Direction::ALL.len() as isize;
        let index = (heading.index() as isize + self.delta()).rem_euclid(count);
        Direction::from_index(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_directions() {
        assert!(Direction::Up.is_opposite(Direction::Down));
        assert!(Direction::Down.is_opposite(Direction::Up));
        assert!(Direction::Left.is_opposite(Direction::Right));
        assert!(Direction::Right.is_opposite(Direction::Left));

        assert!(!Direction::Up.is_opposite(Direction::Left));
        assert!(!Direction::Up.is_opposite(Direction::Right));
    }

    #[test]
    fn test_direction_displacement() {
        assert_eq!(Direction::Up.displacement(), (-1, 0));
        assert_eq!(Direction::Down.displacement(), (1, 0));
        assert_eq!(Direction::Left.displacement(), (0, -1));
        assert_eq!(Direction::Right.displacement(), (0, 1));
    }

    #[test]
    fn test_turns_from_every_heading() {
        let cases = [
            (Direction::Up, Direction::Right, Direction::Left),
            (Direction::Right, Direction::Down, Direction::Up),
            (Direction::Down, Direction::Left, Direction::Right),
            (Direction::Left, Direction::Up, Direction::Down),
        ];

        for (heading, right, left) in cases {
            assert_eq!(SnakeAction::TurnRight.turn(heading), right);
            assert_eq!(SnakeAction::TurnLeft.turn(heading), left);
            assert_eq!(SnakeAction::Forward.turn(heading), heading);
        }
    }

    #[test]
    fn test_right_of() {
        assert_eq!(Direction::Up.right_of(), Direction::Right);
        assert_eq!(Direction::Left.right_of(), Direction::Up);
    }

    #[test]
    fn test_action_index_roundtrip() {
        for action in SnakeAction::ALL {
            assert_eq!(SnakeAction::from_index(action.index()), Some(action));
        }
        assert_eq!(SnakeAction::from_index(3), None);
    }
}
