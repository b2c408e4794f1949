use std::collections::VecDeque;

use super::{
    action::{Direction, SnakeAction},
    config::BoardConfig,
    random::RandomSource,
    state::{Position, Snapshot, block_distance, closest_direction},
};
use crate::error::{LearnerError, Result};

/// The snake game simulation
///
/// The board exclusively owns the snake body (tail first, head last), the
/// heading, the food cell and the move counter. Termination is not stored:
/// [`Board::done`] recomputes it from the current geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: usize,
    columns: usize,
    initial_length: usize,
    snake: VecDeque<Position>,
    heading: Direction,
    /// `None` once no free cell is left, i.e. the board is won
    food: Option<Position>,
    moves: usize,
    last_food_move: usize,
}

impl Board {
    /// Create a board with a random self-avoiding snake and random food
    pub fn new(config: BoardConfig, rng: &mut impl RandomSource) -> Result<Self> {
        config.validate().map_err(LearnerError::InvalidConfig)?;

        let mut board = Self {
            rows: config.rows,
            columns: config.columns,
            initial_length: config.initial_length,
            snake: VecDeque::with_capacity(config.initial_length),
            heading: Direction::Up,
            food: None,
            moves: 0,
            last_food_move: 0,
        };
        board.restart(rng);

        Ok(board)
    }

    /// Build a board from explicit geometry
    ///
    /// `body` is ordered tail first, head last. The body must be a chain of
    /// distinct, adjacent cells inside the grid, the heading must not point
    /// back into the neck, and the food must lie on a free cell. A board
    /// without food is only accepted when the body covers every cell.
    ///
    /// Later restarts place a snake as long as `body`, capped at half the
    /// board.
    pub fn from_parts<P: Into<Position>>(
        rows: usize,
        columns: usize,
        body: impl IntoIterator<Item = P>,
        heading: Direction,
        food: Option<Position>,
    ) -> Result<Self> {
        BoardConfig::new(rows, columns)
            .with_initial_length(1)
            .validate()
            .map_err(LearnerError::InvalidConfig)?;

        let mut board = Self {
            rows,
            columns,
            initial_length: 1,
            snake: body.into_iter().map(Into::into).collect(),
            heading,
            food,
            moves: 0,
            last_food_move: 0,
        };
        board.check_parts().map_err(LearnerError::InvalidConfig)?;
        board.initial_length = board.snake.len().min(rows * columns / 2).max(1);

        Ok(board)
    }

    /// Reinitialize in place: new random snake, heading and food, zeroed counters
    pub fn restart(&mut self, rng: &mut impl RandomSource) {
        self.moves = 0;
        self.last_food_move = 0;
        self.place_snake(rng);
        self.put_random_food(rng);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Body cells, tail first, head last
    pub fn snake(&self) -> &VecDeque<Position> {
        &self.snake
    }

    pub fn head(&self) -> Position {
        *self.snake.back().expect("snake body is never empty")
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Moves made since the snake last ate (or since the start)
    pub fn moves_since_food(&self) -> usize {
        self.moves - self.last_food_move
    }

    /// Score is the body length
    pub fn score(&self) -> usize {
        self.snake.len()
    }

    /// True when the snake fills every cell and no food can be placed
    pub fn is_won(&self) -> bool {
        self.food.is_none()
    }

    /// True once the last move left the grid or ran into the body, or the
    /// board is won
    pub fn done(&self) -> bool {
        self.is_won() || !self.is_valid_location(self.head(), false)
    }

    /// Vector from the head to the food; zero when there is no food
    pub fn food_vector(&self) -> (i32, i32) {
        match self.food {
            Some(food) => food.offset_from(self.head()),
            None => (0, 0),
        }
    }

    pub fn in_bounds(&self, cell: Position) -> bool {
        cell.row >= 0
            && (cell.row as usize) < self.rows
            && cell.col >= 0
            && (cell.col as usize) < self.columns
    }

    /// Bounds check plus occupancy check
    ///
    /// With `include_head` false the head cell is left out of the occupancy
    /// check, which is how the head itself is judged after a move.
    pub fn is_valid_location(&self, cell: Position, include_head: bool) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        let occupied = if include_head {
            self.snake.len()
        } else {
            self.snake.len() - 1
        };
        !self.snake.iter().take(occupied).any(|&segment| segment == cell)
    }

    /// Apply a relative turn and move one cell
    pub fn turn(&mut self, action: SnakeAction, rng: &mut impl RandomSource) {
        self.move_to(action.turn(self.heading), rng);
    }

    /// Move one cell in an absolute direction
    ///
    /// The new head is always appended; eating keeps the tail, otherwise the
    /// oldest cell is dropped. A board that is already done is left untouched.
    pub fn move_to(&mut self, direction: Direction, rng: &mut impl RandomSource) {
        if self.done() {
            return;
        }

        self.heading = direction;
        let new_head = self.head().moved_in_direction(direction);
        self.snake.push_back(new_head);
        self.moves += 1;

        if self.food == Some(new_head) {
            self.last_food_move = self.moves;
            self.put_random_food(rng);
        } else {
            self.snake.pop_front();
        }
    }

    /// Place food on a uniformly random free cell (rejection sampling)
    ///
    /// Leaves the board without food when the snake covers every cell.
    pub fn put_random_food(&mut self, rng: &mut impl RandomSource) {
        if self.snake.len() >= self.rows * self.columns {
            self.food = None;
            return;
        }

        loop {
            let cell = self.random_cell(rng);
            if !self.snake.contains(&cell) {
                self.food = Some(cell);
                return;
            }
        }
    }

    /// Frame for an external renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.rows,
            columns: self.columns,
            moves: self.moves,
            snake: self.snake.iter().copied().collect(),
            food: self.food,
            heading: self.heading,
        }
    }

    fn check_parts(&self) -> std::result::Result<(), String> {
        if self.snake.is_empty() {
            return Err("snake body must have at least one cell".to_string());
        }

        for (i, &cell) in self.snake.iter().enumerate() {
            if !self.in_bounds(cell) {
                return Err(format!("body cell {:?} is outside the grid", cell));
            }
            if self.snake.iter().skip(i + 1).any(|&other| other == cell) {
                return Err(format!("body cell {:?} appears twice", cell));
            }
        }

        for (previous, next) in self.snake.iter().zip(self.snake.iter().skip(1)) {
            if block_distance(next.offset_from(*previous)) != 1 {
                return Err(format!("body cells {:?} and {:?} are not adjacent", previous, next));
            }
        }

        if self.snake.len() > 1 {
            let neck = self.snake[self.snake.len() - 2];
            let forward = closest_direction(self.head().offset_from(neck));
            if forward.is_some_and(|forward| forward.is_opposite(self.heading)) {
                return Err(format!("heading {:?} points back into the neck", self.heading));
            }
        }

        match self.food {
            Some(food) if !self.in_bounds(food) => {
                Err(format!("food {:?} is outside the grid", food))
            }
            Some(food) if self.snake.contains(&food) => {
                Err(format!("food {:?} lies on the body", food))
            }
            None if self.snake.len() < self.rows * self.columns => {
                Err("food may only be absent once the body fills the grid".to_string())
            }
            _ => Ok(()),
        }
    }

    fn random_cell(&self, rng: &mut impl RandomSource) -> Position {
        let row = rng.below(self.rows) as i32;
        let col = rng.below(self.columns) as i32;
        Position::new(row, col)
    }

    /// Random self-avoiding walk of `initial_length` cells
    ///
    /// Starts over from a fresh cell whenever the walk boxes itself in.
    fn place_snake(&mut self, rng: &mut impl RandomSource) {
        'placement: loop {
            let start = self.random_cell(rng);
            let mut heading = Direction::ALL[rng.below(Direction::ALL.len())];

            self.snake.clear();
            self.snake.push_back(start);

            while self.snake.len() < self.initial_length {
                let head = self.head();
                let candidates: Vec<Direction> = SnakeAction::ALL
                    .iter()
                    .map(|action| action.turn(heading))
                    .filter(|&direction| {
                        self.is_valid_location(head.moved_in_direction(direction), true)
                    })
                    .collect();

                if candidates.is_empty() {
                    continue 'placement;
                }

                heading = candidates[rng.below(candidates.len())];
                self.snake.push_back(head.moved_in_direction(heading));
            }

            self.heading = heading;
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::random::{RngSource, ScriptedSource};

    fn board(body: &[[i32; 2]], heading: Direction, food: [i32; 2]) -> Board {
        Board::from_parts(8, 8, body.iter().copied(), heading, Some(food.into())).unwrap()
    }

    fn cells(board: &Board) -> Vec<[i32; 2]> {
        board.snake().iter().map(|p| [p.row, p.col]).collect()
    }

    #[test]
    fn test_new_board_is_valid() {
        for seed in 0..50 {
            let mut rng = RngSource::seeded(seed);
            let board = Board::new(BoardConfig::new(8, 8).with_initial_length(5), &mut rng).unwrap();

            assert_eq!(board.score(), 5);
            assert_eq!(board.moves(), 0);
            assert!(!board.done());

            let body: Vec<Position> = board.snake().iter().copied().collect();
            for (i, cell) in body.iter().enumerate() {
                assert!(board.in_bounds(*cell));
                assert!(!body[i + 1..].contains(cell), "duplicate cell {:?}", cell);
            }
            for pair in body.windows(2) {
                let (dr, dc) = pair[1].offset_from(pair[0]);
                assert_eq!(dr.abs() + dc.abs(), 1);
            }

            let neck = body[body.len() - 2];
            assert_eq!(neck.moved_in_direction(board.heading()), board.head());
            assert!(!body.contains(&board.food().unwrap()));
        }
    }

    #[test]
    fn test_crowded_placement_terminates() {
        for seed in 0..20 {
            let mut rng = RngSource::seeded(seed);
            let board = Board::new(BoardConfig::new(4, 4).with_initial_length(8), &mut rng).unwrap();
            assert_eq!(board.score(), 8);
            assert!(!board.done());
        }
    }

    #[test]
    fn test_scripted_placement() {
        // start (3, 4) heading Up, then Up, then Right; food at (0, 0)
        let mut rng = ScriptedSource::new([3, 4, 0, 1, 2, 0, 0]);
        let board = Board::new(BoardConfig::new(8, 8), &mut rng).unwrap();

        assert_eq!(cells(&board), vec![[3, 4], [2, 4], [2, 5]]);
        assert_eq!(board.heading(), Direction::Right);
        assert_eq!(board.food(), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut rng = RngSource::seeded(0);
        assert!(Board::new(BoardConfig::new(2, 2).with_initial_length(3), &mut rng).is_err());
        assert!(Board::from_parts::<Position>(8, 8, [], Direction::Up, None).is_err());
    }

    #[test]
    fn test_from_parts_rejects_broken_geometry() {
        let rejected = |rows, columns, body: &[[i32; 2]], heading, food: Option<[i32; 2]>| {
            matches!(
                Board::from_parts(rows, columns, body.iter().copied(), heading, food.map(Position::from)),
                Err(LearnerError::InvalidConfig(_))
            )
        };

        // food under the body
        assert!(rejected(8, 8, &[[3, 4], [4, 4]], Direction::Down, Some([3, 4])));
        // food off the grid
        assert!(rejected(8, 8, &[[3, 4], [4, 4]], Direction::Down, Some([8, 0])));
        // body off the grid
        assert!(rejected(8, 8, &[[30, 4], [31, 4]], Direction::Down, Some([1, 1])));
        assert!(rejected(8, 8, &[[0, -1], [0, 0]], Direction::Right, Some([1, 1])));
        // repeated cell
        assert!(rejected(8, 8, &[[3, 4], [4, 4], [3, 4]], Direction::Up, Some([1, 1])));
        // gap in the body
        assert!(rejected(8, 8, &[[3, 4], [4, 4], [4, 6]], Direction::Right, Some([1, 1])));
        // heading back into the neck
        assert!(rejected(8, 8, &[[3, 4], [4, 4]], Direction::Up, Some([1, 1])));
        // no food on a board with free cells
        assert!(rejected(8, 8, &[[3, 4], [4, 4]], Direction::Down, None));
        // grids smaller than 2x2
        assert!(rejected(1, 8, &[[0, 4], [0, 5]], Direction::Right, Some([0, 0])));
        assert!(rejected(0, 0, &[[0, 0]], Direction::Right, None));
    }

    #[test]
    fn test_from_parts_accepts_full_board_without_food() {
        let board = Board::from_parts(2, 2, [[0, 0], [0, 1], [1, 1], [1, 0]], Direction::Left, None).unwrap();
        assert!(board.is_won());
        assert!(board.done());
    }

    #[test]
    fn test_from_parts_restart_length_is_capped() {
        let mut rng = RngSource::seeded(2);
        let mut long = Board::from_parts(
            4,
            4,
            [[0, 0], [0, 1], [0, 2], [0, 3], [1, 3], [1, 2], [1, 1], [1, 0], [2, 0]],
            Direction::Down,
            Some(Position::new(3, 3)),
        )
        .unwrap();
        let mut short = board(&[[3, 4], [4, 4]], Direction::Down, [1, 1]);

        long.restart(&mut rng);
        short.restart(&mut rng);

        assert_eq!(long.score(), 8);
        assert_eq!(short.score(), 2);
    }

    #[test]
    fn test_move_down() {
        let mut rng = RngSource::seeded(0);
        let mut board = board(&[[3, 4], [4, 4], [5, 4], [5, 5], [5, 6]], Direction::Down, [1, 1]);

        board.move_to(Direction::Down, &mut rng);

        assert!(!board.done());
        assert_eq!(cells(&board), vec![[4, 4], [5, 4], [5, 5], [5, 6], [6, 6]]);
        assert_eq!(board.score(), 5);
        assert_eq!(board.moves(), 1);
    }

    #[test]
    fn test_move_up() {
        let mut rng = RngSource::seeded(0);
        let mut board = board(&[[3, 4], [4, 4], [4, 5], [4, 6], [4, 7]], Direction::Right, [1, 1]);

        board.move_to(Direction::Up, &mut rng);

        assert!(!board.done());
        assert_eq!(cells(&board), vec![[4, 4], [4, 5], [4, 6], [4, 7], [3, 7]]);
        assert_eq!(board.score(), 5);
    }

    #[test]
    fn test_move_left() {
        let mut rng = RngSource::seeded(0);
        let mut board = board(&[[3, 4], [2, 4], [2, 5], [2, 6], [1, 6]], Direction::Up, [1, 1]);

        board.move_to(Direction::Left, &mut rng);

        assert!(!board.done());
        assert_eq!(cells(&board), vec![[2, 4], [2, 5], [2, 6], [1, 6], [1, 5]]);
    }

    #[test]
    fn test_turn_shifts_body_by_heading() {
        let mut rng = RngSource::seeded(0);
        let mut board = board(&[[4, 2], [4, 3], [4, 4]], Direction::Right, [0, 0]);

        board.turn(SnakeAction::TurnLeft, &mut rng);
        assert_eq!(board.heading(), Direction::Up);
        assert_eq!(cells(&board), vec![[4, 3], [4, 4], [3, 4]]);

        board.turn(SnakeAction::Forward, &mut rng);
        assert_eq!(cells(&board), vec![[4, 4], [3, 4], [2, 4]]);

        board.turn(SnakeAction::TurnRight, &mut rng);
        assert_eq!(board.heading(), Direction::Right);
        assert_eq!(cells(&board), vec![[3, 4], [2, 4], [2, 5]]);
        assert_eq!(board.moves(), 3);
        assert_eq!(board.score(), 3);
    }

    #[test]
    fn test_move_to_food() {
        let mut rng = RngSource::seeded(3);
        let mut board = board(&[[3, 4], [4, 4], [5, 4]], Direction::Down, [5, 5]);
        assert_eq!(board.score(), 3);

        board.move_to(Direction::Right, &mut rng);

        assert!(!board.done());
        assert_eq!(cells(&board), vec![[3, 4], [4, 4], [5, 4], [5, 5]]);
        assert_eq!(board.score(), 4);
        let food = board.food().unwrap();
        assert_ne!(food, Position::new(5, 5));
        assert!(!board.snake().contains(&food));
        assert_eq!(board.moves_since_food(), 0);
    }

    #[test]
    fn test_snake_eat_itself() {
        let mut rng = RngSource::seeded(0);
        let mut board = board(
            &[[3, 4], [4, 4], [5, 4], [6, 4], [6, 5], [5, 5]],
            Direction::Up,
            [1, 1],
        );
        assert_eq!(board.score(), 6);

        board.move_to(Direction::Left, &mut rng);

        assert!(board.done());
        assert_eq!(board.score(), 6);
        assert_eq!(board.moves(), 1);
    }

    #[test]
    fn test_following_the_tail_is_legal() {
        let mut rng = RngSource::seeded(0);
        let mut board = board(&[[4, 4], [4, 5], [5, 5], [5, 4]], Direction::Left, [1, 1]);

        board.move_to(Direction::Up, &mut rng);

        assert!(!board.done());
        assert_eq!(board.head(), Position::new(4, 4));
    }

    #[test]
    fn test_walls_end_the_game() {
        let cases: [(&[[i32; 2]], Direction); 4] = [
            (&[[3, 4], [4, 4], [5, 4], [6, 4], [7, 4]], Direction::Down),
            (&[[4, 4], [3, 4], [2, 4], [1, 4], [0, 4]], Direction::Up),
            (&[[4, 4], [4, 5], [4, 6], [4, 7]], Direction::Right),
            (&[[4, 5], [4, 4], [4, 3], [4, 2], [4, 1], [4, 0]], Direction::Left),
        ];

        for (body, direction) in cases {
            let mut rng = RngSource::seeded(0);
            let mut board = board(body, direction, [1, 1]);
            let score = board.score();
            assert!(!board.done());

            board.move_to(direction, &mut rng);

            assert!(board.done());
            assert!(!board.in_bounds(board.head()));
            assert_eq!(board.score(), score);
            assert_eq!(board.moves(), 1);
        }
    }

    #[test]
    fn test_done_board_is_frozen() {
        let mut rng = RngSource::seeded(0);
        let mut board = board(&[[6, 4], [7, 4]], Direction::Down, [1, 1]);
        board.move_to(Direction::Down, &mut rng);
        assert!(board.done());
        let frozen = board.clone();

        board.turn(SnakeAction::Forward, &mut rng);

        assert_eq!(board, frozen);
        assert!(board.done());
    }

    #[test]
    fn test_is_valid_location_head_handling() {
        let board = board(&[[3, 4], [4, 4]], Direction::Down, [1, 1]);
        assert!(!board.is_valid_location(Position::new(4, 4), true));
        assert!(board.is_valid_location(Position::new(4, 4), false));
        assert!(!board.is_valid_location(Position::new(3, 4), false));
        assert!(!board.is_valid_location(Position::new(-1, 4), false));
        assert!(!board.is_valid_location(Position::new(4, 8), true));
    }

    #[test]
    fn test_random_food_in_snake() {
        let mut board = board(&[[3, 4], [4, 4]], Direction::Down, [1, 1]);
        let mut rng = ScriptedSource::new([3, 4, 5, 6]);

        board.put_random_food(&mut rng);

        assert_eq!(board.food(), Some(Position::new(5, 6)));
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_full_board_is_won() {
        let mut rng = RngSource::seeded(0);
        let mut board = Board::from_parts(
            2,
            2,
            [[0, 0], [0, 1], [1, 1]],
            Direction::Down,
            Some(Position::new(1, 0)),
        )
        .unwrap();

        board.move_to(Direction::Left, &mut rng);

        assert_eq!(board.score(), 4);
        assert!(board.is_won());
        assert!(board.done());
        assert_eq!(board.food_vector(), (0, 0));
    }

    #[test]
    fn test_restart_keeps_geometry() {
        let mut rng = RngSource::seeded(11);
        let mut board = Board::new(BoardConfig::new(10, 6), &mut rng).unwrap();
        board.turn(SnakeAction::Forward, &mut rng);

        board.restart(&mut rng);

        assert_eq!(board.moves(), 0);
        assert_eq!(board.rows(), 10);
        assert_eq!(board.columns(), 6);
        assert_eq!(board.score(), 3);
        assert!(!board.done());
    }

    #[test]
    fn test_snapshot() {
        let board = board(&[[3, 4], [4, 4]], Direction::Down, [1, 1]);
        let snapshot = board.snapshot();

        assert_eq!(snapshot.rows, 8);
        assert_eq!(snapshot.columns, 8);
        assert_eq!(snapshot.moves, 0);
        assert_eq!(snapshot.head(), Some(Position::new(4, 4)));
        assert_eq!(snapshot.food, Some(Position::new(1, 1)));
        assert_eq!(board.food_vector(), (-3, -3));
    }
}
