mod concurrent;
mod travel_sample;
