mod postgres;

pub use postgres::PgFacultyStore;
