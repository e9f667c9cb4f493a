pub mod coordinate_table;
