//! The built-in word corpus and candidate drawing.

use std::sync::Arc;

use rand::Rng;
use rand::seq::index;

use wordwolf_protocol::Difficulty;

/// Words the mayor chooses the secret word from, split by difficulty.
#[derive(Debug, Clone)]
pub struct WordBank {
    easy: Arc<[String]>,
    medium: Arc<[String]>,
    hard: Arc<[String]>,
}

impl WordBank {
    /// Builds a bank from explicit tiers. Duplicates inside a tier are
    /// dropped so a draw never offers the same word twice.
    pub fn from_lists<S: AsRef<str>>(easy: &[S], medium: &[S], hard: &[S]) -> Self {
        Self {
            easy: dedup(easy),
            medium: dedup(medium),
            hard: dedup(hard),
        }
    }

    /// A bank where every difficulty draws from the same words.
    pub fn uniform<S: AsRef<str>>(words: &[S]) -> Self {
        let words = dedup(words);
        Self {
            easy: Arc::clone(&words),
            medium: Arc::clone(&words),
            hard: words,
        }
    }

    /// The words of one tier.
    pub fn tier(&self, difficulty: Difficulty) -> &[String] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Draws up to `n` distinct words from the tier, in random order.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        difficulty: Difficulty,
        n: usize,
        rng: &mut R,
    ) -> Vec<String> {
        let pool = self.tier(difficulty);
        let n = n.min(pool.len());
        index::sample(rng, pool.len(), n)
            .into_iter()
            .map(|i| pool[i].clone())
            .collect()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::from_lists(EASY, MEDIUM, HARD)
    }
}

fn dedup<S: AsRef<str>>(words: &[S]) -> Arc<[String]> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for w in words {
        let w = w.as_ref();
        if !out.iter().any(|x| x == w) {
            out.push(w.to_string());
        }
    }
    out.into()
}

const EASY: &[&str] = &[
    "Cat", "Dog", "Fish", "Bird", "Bear", "Frog", "Cow", "Pig", "Duck", "Owl",
    "Rabbit", "Tiger", "Lion", "Horse", "Sheep", "Puppy", "Kitten", "Deer",
    "Pizza", "Bread", "Cheese", "Cookie", "Banana", "Apple", "Candy", "Cake",
    "Pasta", "Burger", "Taco", "Donut", "Honey", "Egg", "Milk", "Rice", "Ball",
    "Book", "Chair", "Door", "Clock", "Bell", "Key", "Lamp", "Bed", "Cup",
    "Hat", "Shoe", "Bag", "Kite", "Box", "Ring", "Sun", "Moon", "Star", "Tree",
    "Rain", "Snow", "Wind", "Fire", "River", "Beach", "Cloud", "Flower", "Rock",
    "Sand", "Leaf", "Grass", "School", "House", "Park", "Farm", "Garden",
    "Beach", "Shop", "Zoo", "Dream", "Love", "Hope", "Joy", "Fun", "Play",
    "Song", "Gift",
];

const MEDIUM: &[&str] = &[
    "Elephant", "Penguin", "Dolphin", "Eagle", "Butterfly", "Fox", "Wolf",
    "Parrot", "Octopus", "Giraffe", "Kangaroo", "Turtle", "Hamster", "Panda",
    "Flamingo", "Jellyfish", "Seahorse", "Koala", "Hedgehog", "Otter",
    "Peacock", "Cheetah", "Gorilla", "Hummingbird", "Lobster", "Raccoon",
    "Squirrel", "Alpaca", "Chocolate", "Coffee", "Sushi", "Watermelon",
    "Pancake", "Popcorn", "Avocado", "Strawberry", "Waffle", "Pretzel", "Mango",
    "Cinnamon", "Milkshake", "Pineapple", "Cupcake", "Marshmallow", "Noodle",
    "Pickle", "Smoothie", "Croissant", "Dumpling", "Ramen", "Muffin", "Caramel",
    "Coconut", "Cheesecake", "Macaron", "Nachos", "Mountain", "Ocean", "Forest",
    "Desert", "Volcano", "Rainbow", "Thunder", "Sunset", "Waterfall", "Island",
    "Cave", "Meadow", "Canyon", "Tornado", "Lightning", "Valley", "Glacier",
    "Jungle", "Mirror", "Castle", "Bridge", "Compass", "Lantern", "Treasure",
    "Crown", "Shield", "Sword", "Umbrella", "Backpack", "Ladder", "Anchor",
    "Balloon", "Whistle", "Feather", "Pillow", "Hammock", "Kite", "Boomerang",
    "Hourglass", "Trophy", "Medal", "Puzzle", "Dice", "Yo-yo", "Snowglobe",
    "Wand", "Library", "Museum", "Lighthouse", "Stadium", "Temple", "Palace",
    "Theater", "Aquarium", "Bakery", "Greenhouse", "Treehouse", "Igloo",
    "Cottage", "Mansion", "Tower", "Fortress", "Playground", "Pier", "Harbor",
    "Barn", "Cabin", "Astronaut", "Detective", "Pirate", "Wizard", "Knight",
    "Chef", "Pilot", "Ninja", "Samurai", "Doctor", "Firefighter", "Artist",
    "Musician", "Dancer", "Cowboy", "Magician", "Mermaid", "Fairy", "Soccer",
    "Basketball", "Tennis", "Skateboard", "Surfing", "Archery", "Boxing",
    "Golf", "Hockey", "Volleyball", "Bowling", "Chess", "Frisbee", "Gymnastics",
    "Guitar", "Piano", "Violin", "Drums", "Trumpet", "Flute", "Origami",
    "Submarine", "Spaceship", "Bicycle", "Helicopter", "Robot", "Camera",
    "Rocket", "Sneaker", "Scarf", "Helmet", "Cape", "Goggles", "Boots",
    "Birthday", "Halloween", "Christmas", "Fireworks", "Parade", "Festival",
    "Costume", "Pumpkin", "Snowman", "Confetti",
];

const HARD: &[&str] = &[
    "Chameleon", "Sloth", "Moose", "Falcon", "Swan", "Duckling", "Piglet",
    "Crab", "Bubbletea", "Gummy", "Brownie", "Corndog", "Lemonade", "Glacier",
    "Coral", "Aurora", "Blizzard", "Tsunami", "Avalanche", "Eclipse", "Geyser",
    "Lagoon", "Savanna", "Oasis", "Tundra", "Reef", "Swamp", "Fjord", "Marsh",
    "Prairie", "Hailstone", "Galaxy", "Asteroid", "Nebula", "Comet",
    "Satellite", "Blackhole", "Constellation", "Supernova", "Orbit",
    "Telescope", "Meteor", "Gravity", "Molecule", "Prism", "Spectrum",
    "Electron", "Photon", "Laser", "Fossil", "Dinosaur", "Chromosome",
    "Crystal", "Mineral", "Kaleidoscope", "Pendulum", "Pinwheel", "Locket",
    "Bracelet", "Necklace", "Tiara", "Shadow", "Silence", "Echo", "Fortune",
    "Mystery", "Freedom", "Harmony", "Wisdom", "Courage", "Illusion", "Memory",
    "Balance", "Patience", "Curiosity", "Kindness", "Nostalgia", "Serenity",
    "Adventure", "Destiny", "Legend", "Secret", "Riddle", "Paradox", "Miracle",
    "Chaos", "Peace", "Laughter", "Friendship", "Journey", "Promise", "Phoenix",
    "Griffin", "Centaur", "Pegasus", "Minotaur", "Kraken", "Hydra", "Sphinx",
    "Werewolf", "Vampire", "Zombie", "Goblin", "Troll", "Ogre", "Cyclops",
    "Basilisk", "Chimera", "Banshee", "Leprechaun", "Skeleton", "Heartbeat",
    "Fingerprint", "Backbone", "Eyelash", "Dimple", "Polkadot", "Camouflage",
    "Zigzag", "Checkerboard", "Gradient", "Silhouette", "Architect", "Inventor",
    "Explorer", "Blacksmith", "Carpenter", "Jester", "Gladiator", "Viking",
    "Elf", "Dwarf", "Hospital", "Airport", "Cathedral", "Warehouse", "Carnival",
    "Observatory", "Dungeon", "Chapel", "Marketplace", "Vineyard", "Ranch",
    "Doorbell", "Chimney", "Staircase", "Bathtub", "Chandelier", "Fireplace",
    "Bookshelf", "Windowsill", "Mailbox", "Cupboard", "Pantry", "Gazebo",
    "Snowflake", "Breeze", "Frost", "Icicle", "Dewdrop", "Mist", "Sleet",
    "Humidity", "Drought",
];
