pub mod game_repository;
pub mod player_repository;

pub use game_repository::GameRepository;
pub use player_repository::PlayerRepository;
