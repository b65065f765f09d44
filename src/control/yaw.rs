/// Signed yaw error `target - current` taking the short way round, in (-180, 180].
///
/// Both angles are degrees in [0, 360). A half-turn tie resolves to +180.
pub fn shortest_yaw_error(current: i16, target: i16) -> i16 {
    let diff = (target as i32 - current as i32).rem_euclid(360);
    if diff > 180 {
        (diff - 360) as i16
    } else {
        diff as i16
    }
}
