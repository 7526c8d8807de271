pub mod engine;
pub mod nsga2;
pub mod operators;
pub mod seeding;
