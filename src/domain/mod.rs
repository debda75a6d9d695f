// Domain layer - Speed, unit and location value types
pub mod coordinates;
pub mod speed;
pub mod speedometer;
pub mod unit;
