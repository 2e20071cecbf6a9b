//! # Tutorial: Building service objects with convenient
//!
//! Learn to declare classes, intercept their methods and share behavior
//! through configs, step by step.
//!
//! ## Chapters
//!
//! 1. [Getting Started][chapter_0] - Your first class and middleware
//! 2. [Configs & Concerns][chapter_1] - Reusable, composable class bodies
//! 3. [Commit & Inheritance][chapter_2] - When stacks freeze, subclasses and `super`
//! 4. [Middleware][chapter_3] - Built-in middlewares, ordering and observers
//!
//! Ready? Start with [Chapter 0: Getting Started][chapter_0].

pub mod chapter_0;
pub mod chapter_1;
pub mod chapter_2;
pub mod chapter_3;
